//! Identifier uniqueness across the definition set.

use std::collections::HashMap;

use mailharbor_common::ValidationError;

use crate::schema::RawDefinition;

/// Reject identifier collisions, including case-only and cross-extension
/// (`alice.yaml` vs `Alice.yml`) collisions.
pub(crate) fn validate_unique_ids(errors: &mut Vec<ValidationError>, raw: &[RawDefinition]) {
    let mut seen: HashMap<String, &RawDefinition> = HashMap::new();

    for def in raw {
        let key = def.id.to_lowercase();
        if let Some(existing) = seen.get(key.as_str()) {
            errors.push(ValidationError::DuplicateId {
                id: def.id.clone(),
                first: existing.file_name.clone(),
                second: def.file_name.clone(),
            });
        } else {
            seen.insert(key, def);
        }
    }
}
