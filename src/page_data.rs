//! Page-data document patching.
//!
//! The front-end fetches a JSON page-state document per route. Its `page`
//! object carries localized (`{lang: text}`) SEO fields; this module writes
//! the `en` leaves and `metaImage`, leaving every other field and locale alone.

use serde_json::{Map, Value};

use crate::metadata::types::Metadata;

/// Locale written into localized fields.
pub const LOCALE: &str = "en";

/// Patch `document` in place with `metadata`.
pub fn patch(document: &mut Value, metadata: &Metadata) {
    let root = object_slot(document);
    let page = child_object(root, "page");

    set_locale(child_object(page, "title"), &metadata.title);

    let meta = child_object(page, "meta");
    set_locale(child_object(meta, "desc"), &metadata.description);
    set_locale(child_object(meta, "keywords"), &metadata.keywords);

    set_locale(child_object(page, "socialTitle"), &metadata.title);
    set_locale(child_object(page, "socialDesc"), &metadata.description);

    page.insert("metaImage".to_string(), Value::String(metadata.image.clone()));
}

fn child_object<'a>(parent: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    object_slot(parent.entry(key).or_insert(Value::Null))
}

/// Turn `slot` into an object if it is anything else, and borrow the map.
fn object_slot(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced by an object"),
    }
}

fn set_locale(field: &mut Map<String, Value>, text: &str) {
    field.insert(LOCALE.to_string(), Value::String(text.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::types::DefaultMetadata;
    use serde_json::json;

    fn metadata() -> Metadata {
        let mut m = DefaultMetadata::default().metadata();
        m.title = "T".into();
        m.description = "D".into();
        m.keywords = "K".into();
        m.image = "I".into();
        m
    }

    #[test]
    fn test_patch_empty_page() {
        let mut document = json!({ "page": {} });
        patch(&mut document, &metadata());

        assert_eq!(document["page"]["title"]["en"], "T");
        assert_eq!(document["page"]["meta"]["desc"]["en"], "D");
        assert_eq!(document["page"]["meta"]["keywords"]["en"], "K");
        assert_eq!(document["page"]["metaImage"], "I");
        assert_eq!(document["page"]["socialTitle"]["en"], "T");
        assert_eq!(document["page"]["socialDesc"]["en"], "D");
    }

    #[test]
    fn test_patch_preserves_other_locales_and_fields() {
        let mut document = json!({
            "id": "abc",
            "page": {
                "title": { "en": "old", "pt": "antigo" },
                "meta": { "desc": { "pt": "desc" }, "robots": "all" },
                "sections": [1, 2, 3]
            }
        });
        patch(&mut document, &metadata());

        assert_eq!(document["id"], "abc");
        assert_eq!(document["page"]["title"], json!({ "en": "T", "pt": "antigo" }));
        assert_eq!(document["page"]["meta"]["desc"], json!({ "pt": "desc", "en": "D" }));
        assert_eq!(document["page"]["meta"]["robots"], "all");
        assert_eq!(document["page"]["sections"], json!([1, 2, 3]));
    }

    #[test]
    fn test_patch_creates_page_and_replaces_scalars() {
        let mut document = json!({ "page": { "title": "flat" } });
        patch(&mut document, &metadata());
        assert_eq!(document["page"]["title"], json!({ "en": "T" }));

        let mut missing = json!({});
        patch(&mut missing, &metadata());
        assert_eq!(missing["page"]["socialDesc"]["en"], "D");

        let mut not_object = json!([1]);
        patch(&mut not_object, &metadata());
        assert_eq!(not_object["page"]["metaImage"], "I");
    }
}
