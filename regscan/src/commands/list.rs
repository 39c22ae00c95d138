use crate::commands::build_manager;
use crate::context::AppContext;
use crate::format::{Formattable, OutputFormat, print_output};
use chrono::{DateTime, Utc};
use libregscan::format::{format_digest, format_pushed, format_size, or_unknown};
use libregscan::{ImageIdentity, RemoteRegistry};
use serde::Serialize;
use tabled::Tabled;

/// One enumerated image, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ImageItem {
    /// Backend that enumerated the image
    #[tabled(skip)]
    pub backend: String,

    #[tabled(rename = "REGISTRY")]
    pub registry: String,

    #[tabled(rename = "REPOSITORY")]
    pub repository: String,

    #[tabled(rename = "TAG")]
    #[serde(skip)]
    pub tag_display: String,

    #[tabled(rename = "DIGEST")]
    #[serde(skip)]
    pub digest_display: String,

    #[tabled(rename = "PUSHED")]
    #[serde(skip)]
    pub pushed_display: String,

    #[tabled(rename = "SIZE")]
    #[serde(skip)]
    pub size_display: String,

    /// Pull reference; empty when it could not be composed
    #[tabled(rename = "REFERENCE")]
    pub reference: String,

    #[tabled(skip)]
    pub primary_tag: Option<String>,

    #[tabled(skip)]
    pub tags: Vec<String>,

    #[tabled(skip)]
    pub provider_digest: String,

    #[tabled(skip)]
    pub canonical_digest: Option<String>,

    #[tabled(skip)]
    pub pushed_at: Option<DateTime<Utc>>,

    #[tabled(skip)]
    pub size_bytes: Option<u64>,
}

impl ImageItem {
    pub fn new(backend: &str, image: &ImageIdentity, reference: String) -> Self {
        Self {
            backend: backend.to_string(),
            registry: or_unknown(&image.registry_id).to_string(),
            repository: image.repository.clone(),
            tag_display: or_unknown(image.primary_tag.as_deref().unwrap_or_default()).to_string(),
            digest_display: format_digest(image.canonical_digest.as_ref()),
            pushed_display: format_pushed(image.pushed_at.as_ref()),
            size_display: format_size(image.size_bytes),
            reference,
            primary_tag: image.primary_tag.clone(),
            tags: image.tags.clone(),
            provider_digest: image.provider_digest.to_string(),
            canonical_digest: image.canonical_digest.as_ref().map(|d| d.to_string()),
            pushed_at: image.pushed_at,
            size_bytes: image.size_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageList {
    pub images: Vec<ImageItem>,
}

impl ImageList {
    pub fn sort(&mut self) {
        self.images.sort_by(|a, b| {
            (&a.registry, &a.repository, &a.primary_tag).cmp(&(
                &b.registry,
                &b.repository,
                &b.primary_tag,
            ))
        });
    }
}

impl Formattable for ImageList {
    fn format_pretty(&self) -> String {
        if self.images.is_empty() {
            return "No images found.".to_string();
        }
        use tabled::{Table, settings::Style};
        Table::new(&self.images).with(Style::empty()).to_string()
    }
}

/// Handle the list command
pub async fn handle_list(ctx: &AppContext, format: OutputFormat, quiet: bool) {
    let mut manager = build_manager(ctx);

    let spinner = ctx.formatter.spinner("Enumerating remote images...");
    let outcomes = manager.enumerate_all().await;
    spinner.finish_and_clear();

    let mut list = ImageList { images: Vec::new() };
    let mut blocked = false;
    for (outcome, backend) in outcomes.iter().zip(manager.backends()) {
        let enumeration = match &outcome.outcome {
            Ok(enumeration) => enumeration,
            Err(e) => {
                ctx.formatter.error(&format!("{}: {}", outcome.backend, e));
                blocked = true;
                continue;
            }
        };
        for failure in &enumeration.failures {
            ctx.formatter
                .warning(&format!("{}: {}: {}", outcome.backend, failure.scope, failure.error));
        }
        for image in &enumeration.images {
            let reference = backend.full_pull_reference(image);
            list.images.push(ImageItem::new(outcome.backend, image, reference));
        }
    }
    list.sort();

    if quiet {
        for image in list.images.iter().filter(|i| !i.reference.is_empty()) {
            println!("{}", image.reference);
        }
    } else {
        print_output(ctx.formatter.as_ref(), &list, format);
    }

    if blocked {
        std::process::exit(1);
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
