//! JSON-LD structured data for the page subject.

use serde_json::{json, Value};

use crate::config::schema::ContentKind;
use crate::metadata::types::Metadata;

/// schema.org type for a content kind.
pub fn schema_type(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Business => "LocalBusiness",
        ContentKind::Event => "Event",
        ContentKind::Job => "JobPosting",
        ContentKind::Article => "Article",
        ContentKind::WebPage => "WebPage",
    }
}

/// Build the structured-data object for `metadata` at `page_url`.
pub fn structured_data(metadata: &Metadata, page_url: &str) -> Value {
    let kind = metadata.kind.unwrap_or(ContentKind::WebPage);
    let mut data = json!({
        "@context": "https://schema.org",
        "@type": schema_type(kind),
        "name": metadata.title,
        "description": metadata.description,
        "url": page_url,
        "image": metadata.image,
    });

    match kind {
        ContentKind::Business => {
            data["address"] = json!({
                "@type": "PostalAddress",
                "streetAddress": "",
                "addressLocality": "",
                "addressRegion": "",
                "postalCode": "",
                "addressCountry": "",
            });
        }
        ContentKind::Event => {
            if let Some(start) = &metadata.start_date {
                data["startDate"] = json!(start);
            }
            data["eventStatus"] = json!("https://schema.org/EventScheduled");
            data["eventAttendanceMode"] = json!("https://schema.org/OfflineEventAttendanceMode");
        }
        ContentKind::Job => {
            data["title"] = json!(metadata.title);
        }
        ContentKind::Article => {
            data["headline"] = json!(metadata.title);
        }
        ContentKind::WebPage => {}
    }

    data
}

/// Render the object as a `<script type="application/ld+json">` block.
pub fn script_block(data: &Value) -> String {
    // `</` would close the script element early.
    let body = data.to_string().replace("</", "<\\/");
    format!(r#"<script type="application/ld+json">{body}</script>"#)
}
