//! Print-catalogue layout: chapter classification and page numbering.

use db::models::product::Product;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// The four thematic chapters of the printed catalogue, in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Chapter {
    Monoliths,
    Screens,
    Skins,
    Collection,
}

impl Chapter {
    /// All chapters in print order.
    pub const ORDER: [Chapter; 4] = [
        Chapter::Monoliths,
        Chapter::Screens,
        Chapter::Skins,
        Chapter::Collection,
    ];

    /// Display heading used on the chapter divider page.
    pub fn heading(self) -> &'static str {
        match self {
            Chapter::Monoliths => "Monoliths",
            Chapter::Screens => "Screens",
            Chapter::Skins => "Skins",
            Chapter::Collection => "Collection",
        }
    }
}

/// Classify a product title into exactly one chapter. Total and deterministic:
/// evaluation order is the tie-break, and anything unmatched falls through to
/// `Collection`.
pub fn classify(title: &str) -> Chapter {
    let t = title.to_lowercase();

    if t.contains("brick") && !t.contains("tile") && !t.contains("cladding") {
        return Chapter::Monoliths;
    }
    if ["jaali", "screen", "perforated", "breeze"]
        .iter()
        .any(|kw| t.contains(kw))
    {
        return Chapter::Screens;
    }
    if ["tile", "cladding", "facade", "panel", "louver"]
        .iter()
        .any(|kw| t.contains(kw))
    {
        return Chapter::Skins;
    }
    Chapter::Collection
}

/// One rendered product page.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CataloguePage {
    pub page_number: u32,
    pub product: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CatalogueChapter {
    pub chapter: Chapter,
    pub heading: String,
    pub pages: Vec<CataloguePage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Catalogue {
    pub chapters: Vec<CatalogueChapter>,
    /// Page number of the last product page.
    pub last_page: u32,
}

/// The counter value before the first product page. Cover and intro occupy the
/// pages up to and including 3, so the first product lands on page 4.
pub const PAGE_COUNTER_START: u32 = 3;

/// Group products into chapters and assign running page numbers. Products keep
/// their fetch order inside each chapter; chapters with no products are
/// omitted entirely.
pub fn build_catalogue(products: Vec<Product>) -> Catalogue {
    let mut buckets: Vec<(Chapter, Vec<Product>)> =
        Chapter::ORDER.iter().map(|c| (*c, Vec::new())).collect();

    for product in products {
        let chapter = classify(&product.title);
        if let Some((_, bucket)) = buckets.iter_mut().find(|(c, _)| *c == chapter) {
            bucket.push(product);
        }
    }

    let mut counter = PAGE_COUNTER_START;
    let mut chapters = Vec::new();

    for (chapter, bucket) in buckets {
        if bucket.is_empty() {
            continue;
        }
        let pages = bucket
            .into_iter()
            .map(|product| {
                counter += 1;
                CataloguePage {
                    page_number: counter,
                    product,
                }
            })
            .collect();
        chapters.push(CatalogueChapter {
            chapter,
            heading: chapter.heading().to_string(),
            pages,
        });
    }

    Catalogue {
        chapters,
        last_page: counter,
    }
}
