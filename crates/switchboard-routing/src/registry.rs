//! Static selector-token → department mapping.
//!
//! Built once from configuration at startup, validated eagerly, and
//! shared read-only across calls. The registry also renders the
//! touch-tone menu and the per-department intents advertised to the
//! dialog runtime, so the advertised selection surface can never drift
//! from what `resolve` accepts.

use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while building the registry at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("department '{0}' has no destination address configured")]
    MissingDestination(String),

    #[error("selector token '{token}' is claimed by both '{first}' and '{second}'")]
    AmbiguousToken {
        token: String,
        first: String,
        second: String,
    },

    #[error("registry has no departments")]
    Empty,
}

/// A call-routing destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentEntry {
    /// Name spoken to the caller ("Billing").
    pub display_name: String,
    /// Destination address handed to the transfer control plane.
    pub transfer_to: String,
    /// Touch-tone digit selecting this department.
    pub dtmf_digit: String,
    /// Additional spoken selector tokens beyond the normalized name.
    pub aliases: Vec<String>,
}

impl DepartmentEntry {
    pub fn new(
        display_name: impl Into<String>,
        transfer_to: impl Into<String>,
        dtmf_digit: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            transfer_to: transfer_to.into(),
            dtmf_digit: dtmf_digit.into(),
            aliases: Vec::new(),
        }
    }

    /// Name of the dialog-runtime intent for this department, e.g.
    /// `transfer_to_tech_support`.
    pub fn intent_name(&self) -> String {
        format!(
            "transfer_to_{}",
            normalize_token(&self.display_name).replace(' ', "_")
        )
    }

    fn selector_tokens(&self) -> Vec<String> {
        let mut tokens = vec![
            normalize_token(&self.dtmf_digit),
            normalize_token(&self.display_name),
        ];
        tokens.extend(self.aliases.iter().map(|alias| normalize_token(alias)));
        tokens
    }
}

/// A department-selection handler advertised to the dialog runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentDescriptor {
    /// Tool name declared to the runtime.
    pub name: String,
    /// Natural-language description shown to the language model.
    pub description: String,
    /// Selector token the runtime passes back on invocation.
    pub token: String,
}

/// Immutable department lookup, shared across calls without locking.
#[derive(Debug)]
pub struct DepartmentRegistry {
    entries: Vec<DepartmentEntry>,
    by_token: HashMap<String, usize>,
}

impl DepartmentRegistry {
    /// Builds the registry, validating eagerly: a department without a
    /// destination address or a selector token claimed by two
    /// departments aborts startup instead of misrouting at transfer
    /// time.
    pub fn from_entries(entries: Vec<DepartmentEntry>) -> Result<Self, RegistryError> {
        if entries.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut by_token: HashMap<String, usize> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            if entry.transfer_to.trim().is_empty() {
                return Err(RegistryError::MissingDestination(entry.display_name.clone()));
            }

            for token in entry.selector_tokens() {
                if token.is_empty() {
                    continue;
                }
                match by_token.get(&token) {
                    Some(&previous) if previous != index => {
                        return Err(RegistryError::AmbiguousToken {
                            token,
                            first: entries[previous].display_name.clone(),
                            second: entry.display_name.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        by_token.insert(token, index);
                    }
                }
            }
        }

        Ok(Self { entries, by_token })
    }

    /// Pure lookup. Unknown tokens fail closed with `None`; the caller
    /// treats that as an invalid selection, never a fatal error.
    pub fn resolve(&self, token: &str) -> Option<&DepartmentEntry> {
        self.by_token
            .get(&normalize_token(token))
            .map(|&index| &self.entries[index])
    }

    pub fn entries(&self) -> &[DepartmentEntry] {
        &self.entries
    }

    /// Renders the touch-tone menu line spoken in the greeting.
    pub fn menu_prompt(&self) -> String {
        let options: Vec<String> = self
            .entries
            .iter()
            .map(|entry| format!("press {} for {}", entry.dtmf_digit, entry.display_name))
            .collect();

        match options.split_last() {
            Some((last, [])) => format!("You can {}.", last),
            Some((last, rest)) => format!("You can {}, or {}.", rest.join(", "), last),
            None => String::new(),
        }
    }

    /// One dialog-runtime intent per department.
    pub fn intent_descriptors(&self) -> Vec<IntentDescriptor> {
        self.entries
            .iter()
            .map(|entry| IntentDescriptor {
                name: entry.intent_name(),
                description: format!(
                    "Transfer the call to the {} department.",
                    entry.display_name
                ),
                token: normalize_token(&entry.display_name),
            })
            .collect()
    }
}

fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_registry() -> DepartmentRegistry {
        DepartmentRegistry::from_entries(vec![
            DepartmentEntry::new("Billing", "+15550000001", "1"),
            DepartmentEntry::new("Tech Support", "+15550000002", "2"),
            DepartmentEntry::new("Customer Service", "+15550000003", "3"),
        ])
        .expect("valid registry")
    }

    #[test]
    fn resolves_every_known_token() {
        let registry = standard_registry();

        assert_eq!(
            registry.resolve("1").map(|e| e.display_name.as_str()),
            Some("Billing")
        );
        assert_eq!(
            registry.resolve("2").map(|e| e.display_name.as_str()),
            Some("Tech Support")
        );
        assert_eq!(
            registry.resolve("3").map(|e| e.display_name.as_str()),
            Some("Customer Service")
        );
        assert_eq!(
            registry.resolve("billing").map(|e| e.display_name.as_str()),
            Some("Billing")
        );
        assert_eq!(
            registry
                .resolve("Tech Support")
                .map(|e| e.transfer_to.as_str()),
            Some("+15550000002")
        );
    }

    #[test]
    fn unknown_tokens_fail_closed() {
        let registry = standard_registry();
        assert!(registry.resolve("5").is_none());
        assert!(registry.resolve("").is_none());
        assert!(registry.resolve("sales").is_none());
    }

    #[test]
    fn lookup_normalizes_case_and_whitespace() {
        let registry = standard_registry();
        assert!(registry.resolve("  BILLING ").is_some());
        assert!(registry.resolve("tech support").is_some());
    }

    #[test]
    fn aliases_resolve_to_their_department() {
        let mut entry = DepartmentEntry::new("Tech Support", "+15550000002", "2");
        entry.aliases = vec!["technical support".to_string(), "support".to_string()];
        let registry = DepartmentRegistry::from_entries(vec![entry]).expect("valid registry");

        assert_eq!(
            registry
                .resolve("Technical Support")
                .map(|e| e.display_name.as_str()),
            Some("Tech Support")
        );
        assert!(registry.resolve("support").is_some());
    }

    #[test]
    fn missing_destination_is_rejected() {
        let result = DepartmentRegistry::from_entries(vec![DepartmentEntry::new(
            "Billing", "  ", "1",
        )]);
        assert!(matches!(
            result,
            Err(RegistryError::MissingDestination(name)) if name == "Billing"
        ));
    }

    #[test]
    fn duplicate_selector_token_is_rejected() {
        let result = DepartmentRegistry::from_entries(vec![
            DepartmentEntry::new("Billing", "+15550000001", "1"),
            DepartmentEntry::new("Invoices", "+15550000009", "1"),
        ]);
        assert!(matches!(
            result,
            Err(RegistryError::AmbiguousToken { token, .. }) if token == "1"
        ));
    }

    #[test]
    fn empty_registry_is_rejected() {
        assert!(matches!(
            DepartmentRegistry::from_entries(Vec::new()),
            Err(RegistryError::Empty)
        ));
    }

    #[test]
    fn menu_prompt_names_every_option() {
        let registry = standard_registry();
        assert_eq!(
            registry.menu_prompt(),
            "You can press 1 for Billing, press 2 for Tech Support, or press 3 for Customer Service."
        );
    }

    #[test]
    fn intent_descriptors_match_the_registry() {
        let registry = standard_registry();
        let descriptors = registry.intent_descriptors();

        assert_eq!(descriptors.len(), 3);
        assert_eq!(descriptors[0].name, "transfer_to_billing");
        assert_eq!(descriptors[1].name, "transfer_to_tech_support");
        assert_eq!(descriptors[2].name, "transfer_to_customer_service");

        for descriptor in &descriptors {
            assert!(
                registry.resolve(&descriptor.token).is_some(),
                "descriptor token '{}' must resolve",
                descriptor.token
            );
        }
    }
}
