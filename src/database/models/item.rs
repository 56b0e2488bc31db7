use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

pub const DEFAULT_QUANTITY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub list_id: Uuid,
    pub name: String,
    #[serde(serialize_with = "serialize_quantity")]
    pub quantity: f64,
    pub unit: String,
    pub note: String,
    pub is_completed: bool,
    pub completed_by: Option<String>,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whole quantities go out as integers so `2` comes back as `2`, not `2.0`
fn serialize_quantity<S: Serializer>(quantity: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if quantity.is_finite() && quantity.fract() == 0.0 && quantity.abs() <= MAX_EXACT {
        serializer.serialize_i64(*quantity as i64)
    } else {
        serializer.serialize_f64(*quantity)
    }
}

/// Fields accepted when creating an item
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub list_id: String,
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub note: Option<String>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub note: Option<String>,
}

impl Item {
    pub fn new(list_id: Uuid, fields: NewItem, added_by: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            list_id,
            name: fields.name.trim().to_string(),
            quantity: fields.quantity.unwrap_or(DEFAULT_QUANTITY),
            unit: fields.unit.unwrap_or_default(),
            note: fields.note.unwrap_or_default(),
            is_completed: false,
            completed_by: None,
            added_by: added_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: ItemChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(quantity) = changes.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = changes.unit {
            self.unit = unit;
        }
        if let Some(note) = changes.note {
            self.note = note;
        }
        self.updated_at = now;
    }

    /// Mark done/undone; `completed_by` tracks who marked it done
    pub fn set_completed(&mut self, completed: bool, user_id: &str, now: DateTime<Utc>) {
        self.is_completed = completed;
        self.completed_by = completed.then(|| user_id.to_string());
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item() -> Item {
        let fields = NewItem {
            list_id: String::new(),
            name: "  Milk ".into(),
            quantity: None,
            unit: None,
            note: None,
        };
        Item::new(Uuid::new_v4(), fields, "u1", Utc::now())
    }

    #[test]
    fn applies_defaults() {
        let item = new_item();
        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, DEFAULT_QUANTITY);
        assert_eq!(item.unit, "");
        assert!(!item.is_completed);
        assert_eq!(item.completed_by, None);
    }

    #[test]
    fn completion_records_and_clears_completer() {
        let mut item = new_item();
        item.set_completed(true, "u2", Utc::now());
        assert_eq!(item.completed_by.as_deref(), Some("u2"));
        item.set_completed(false, "u3", Utc::now());
        assert!(!item.is_completed);
        assert_eq!(item.completed_by, None);
    }

    #[test]
    fn partial_update_keeps_absent_fields() {
        let mut item = new_item();
        item.apply(
            ItemChanges {
                quantity: Some(3.0),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, 3.0);
    }

    #[test]
    fn whole_quantities_serialize_as_integers() {
        let mut item = new_item();
        item.quantity = 2.0;
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["quantity"], serde_json::json!(2));
        assert!(value["quantity"].is_i64());

        item.quantity = 2.5;
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["quantity"], serde_json::json!(2.5));
    }
}
