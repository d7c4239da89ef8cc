// Contract-editor field registry and key routing
//
// The editor keeps one entry per editable field, keyed by a dotted path whose first segment
// routes it:
//   purple.<path>            influencer-side contract tree
//   yellow.<path>            brand-side contract tree
//   sign.<role>.name|email   identity fields for the sign call
//   additionalNotes.<role>   free-text notes (side-channel call)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const SIGN_NAMESPACE: &str = "sign";
pub const NOTES_NAMESPACE: &str = "additionalNotes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Influencer,
    Brand,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Influencer => "influencer",
            Role::Brand => "brand",
        }
    }

    /// Snapshot namespace holding this role's contract tree.
    pub fn namespace(&self) -> &'static str {
        match self {
            Role::Influencer => "purple",
            Role::Brand => "yellow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "influencer" => Some(Role::Influencer),
            "brand" => Some(Role::Brand),
            _ => None,
        }
    }

    pub fn sign_key(&self, field: SignField) -> String {
        format!("{}.{}.{}", SIGN_NAMESPACE, self.as_str(), field.as_str())
    }

    pub fn notes_key(&self) -> String {
        format!("{}.{}", NOTES_NAMESPACE, self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignField {
    Name,
    Email,
}

impl SignField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignField::Name => "name",
            SignField::Email => "email",
        }
    }
}

/// Where a snapshot key goes when the active role builds its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRoute<'a> {
    /// Path (namespace stripped) inside the active role's tree.
    Tree(&'a str),
    Sign(SignField),
    Notes,
    /// Another role's field, or a key no flow consumes.
    Ignored,
}

pub fn route_key(key: &str, role: Role) -> FieldRoute<'_> {
    let (head, rest) = match key.split_once('.') {
        Some(split) => split,
        None => return FieldRoute::Ignored,
    };

    if head == role.namespace() {
        return FieldRoute::Tree(rest);
    }
    if head == SIGN_NAMESPACE {
        return match rest.split_once('.') {
            Some((r, "name")) if r == role.as_str() => FieldRoute::Sign(SignField::Name),
            Some((r, "email")) if r == role.as_str() => FieldRoute::Sign(SignField::Email),
            _ => FieldRoute::Ignored,
        };
    }
    if head == NOTES_NAMESPACE && rest == role.as_str() {
        return FieldRoute::Notes;
    }
    FieldRoute::Ignored
}

/// Phone-like fields keep only digits and `+`; everything else passes through untouched.
pub fn coerce_value(key: &str, value: &str) -> String {
    if is_phone_key(key) {
        coerce_phone(value)
    } else {
        value.to_string()
    }
}

pub fn is_phone_key(key: &str) -> bool {
    key.len() >= 5
        && key
            .get(key.len() - 5..)
            .map(|tail| tail.eq_ignore_ascii_case("phone"))
            .unwrap_or(false)
}

pub fn coerce_phone(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Point-in-time copy of the editor's field values, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSnapshot {
    entries: Vec<(String, String)>,
}

impl FieldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated key keeps its original position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (k, v) in iter {
            snapshot.insert(k, v);
        }
        snapshot
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableField {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// Editable fields of one open contract editor, owned by the UI state.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<EditableField>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-seed) a field. Re-registering a key replaces its label and value.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
    ) {
        let field = EditableField {
            key: key.into(),
            label: label.into(),
            value: value.into(),
        };
        match self.index.get(&field.key) {
            Some(&i) => self.fields[i] = field,
            None => {
                self.index.insert(field.key.clone(), self.fields.len());
                self.fields.push(field);
            }
        }
    }

    /// Returns false when the key was never registered.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.index.get(key) {
            Some(&i) => {
                self.fields[i].value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.fields[i].value.as_str())
    }

    pub fn fields(&self) -> &[EditableField] {
        &self.fields
    }

    pub fn field_mut(&mut self, position: usize) -> Option<&mut EditableField> {
        self.fields.get_mut(position)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Snapshot every registered field with its value trimmed.
pub fn collect_fields(registry: &FieldRegistry) -> FieldSnapshot {
    registry
        .fields()
        .iter()
        .map(|f| (f.key.clone(), f.value.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_active_namespace_into_tree() {
        assert_eq!(
            route_key("purple.profile.phone", Role::Influencer),
            FieldRoute::Tree("profile.phone")
        );
        assert_eq!(
            route_key("yellow.goLive.start", Role::Brand),
            FieldRoute::Tree("goLive.start")
        );
    }

    #[test]
    fn other_role_namespace_is_ignored() {
        assert_eq!(
            route_key("yellow.goLive.start", Role::Influencer),
            FieldRoute::Ignored
        );
        assert_eq!(route_key("sign.brand.name", Role::Influencer), FieldRoute::Ignored);
        assert_eq!(route_key("additionalNotes.influencer", Role::Brand), FieldRoute::Ignored);
    }

    #[test]
    fn routes_sign_and_notes_keys() {
        assert_eq!(
            route_key("sign.brand.email", Role::Brand),
            FieldRoute::Sign(SignField::Email)
        );
        assert_eq!(
            route_key("sign.influencer.name", Role::Influencer),
            FieldRoute::Sign(SignField::Name)
        );
        assert_eq!(route_key("sign.brand.title", Role::Brand), FieldRoute::Ignored);
        assert_eq!(route_key("additionalNotes.brand", Role::Brand), FieldRoute::Notes);
    }

    #[test]
    fn keys_without_namespace_are_ignored() {
        assert_eq!(route_key("purple", Role::Influencer), FieldRoute::Ignored);
        assert_eq!(route_key("", Role::Brand), FieldRoute::Ignored);
    }

    #[test]
    fn phone_suffix_is_case_insensitive() {
        assert!(is_phone_key("purple.profile.phone"));
        assert!(is_phone_key("yellow.contact.mobilePHONE"));
        assert!(!is_phone_key("purple.profile.phoneNumber"));
        assert!(!is_phone_key("hone"));
    }

    #[test]
    fn coerce_phone_keeps_digits_and_plus() {
        assert_eq!(coerce_phone("+1 (555) 222-3333"), "+15552223333");
        assert_eq!(coerce_phone("ext. 42"), "42");
        assert_eq!(coerce_phone(""), "");
    }

    #[test]
    fn coerce_phone_is_idempotent() {
        for raw in ["+1 (555) 222-3333", "00 44 20 7946 0958", "abc", "++12", "٣٤٥ 12"] {
            let once = coerce_phone(raw);
            assert_eq!(coerce_phone(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn non_phone_values_pass_through() {
        assert_eq!(coerce_value("purple.profile.name", "  Ada (QA) "), "  Ada (QA) ");
        assert_eq!(coerce_value("purple.a.b.c.phone", "+44 (0) 1"), "+4401");
    }

    #[test]
    fn snapshot_repeated_key_keeps_position_takes_last_value() {
        let mut s = FieldSnapshot::new();
        s.insert("a", "1");
        s.insert("b", "2");
        s.insert("a", "3");

        let items: Vec<_> = s.iter().collect();
        assert_eq!(items, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn collect_fields_trims_values() {
        let mut reg = FieldRegistry::new();
        reg.register("purple.profile.name", "Name", "  Ada  ");
        reg.register("additionalNotes.influencer", "Notes", "");
        assert!(reg.set("purple.profile.name", " Ada Lovelace\n"));
        assert!(!reg.set("purple.unknown", "x"));

        let snapshot = collect_fields(&reg);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("purple.profile.name"), Some("Ada Lovelace"));
        assert_eq!(snapshot.get("additionalNotes.influencer"), Some(""));
    }

    #[test]
    fn register_twice_replaces_in_place() {
        let mut reg = FieldRegistry::new();
        reg.register("a", "A", "1");
        reg.register("b", "B", "2");
        reg.register("a", "A2", "9");

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.fields()[0].label, "A2");
        assert_eq!(reg.get("a"), Some("9"));
    }

    #[test]
    fn role_parse_and_keys() {
        assert_eq!(Role::parse(" Brand "), Some(Role::Brand));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::Brand.sign_key(SignField::Email), "sign.brand.email");
        assert_eq!(Role::Influencer.notes_key(), "additionalNotes.influencer");
    }
}
