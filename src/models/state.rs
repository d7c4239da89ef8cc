// Session context (in-memory)
//
// Built once at the session boundary (configuration / sign-in) and passed explicitly into the
// save flows; nothing below this layer reads identity from global storage.

use crate::contract::fields::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub brand_id: Option<String>,
}

impl Session {
    pub fn new(role: Role, brand_id: Option<String>) -> Self {
        Self {
            role,
            brand_id: brand_id
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_brand_id_is_treated_as_absent() {
        let s = Session::new(Role::Brand, Some("   ".to_string()));
        assert_eq!(s.brand_id, None);
        let s = Session::new(Role::Brand, Some(" B1 ".to_string()));
        assert_eq!(s.brand_id.as_deref(), Some("B1"));
    }
}
