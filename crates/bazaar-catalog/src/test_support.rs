//! Entity builders shared by unit tests.

use std::collections::BTreeMap;

use bazaar_core::{
    CatalogEntity, Dimension, DimensionValue, Offer, OfferPrice, Pricing, Variation, Vendor,
};
use rust_decimal::Decimal;

pub(crate) struct EntityBuilder(CatalogEntity);

pub(crate) fn entity(id: &str) -> EntityBuilder {
    EntityBuilder(CatalogEntity {
        id: id.to_owned(),
        title: format!("Entity {id}"),
        pricing: Pricing::default(),
        ..CatalogEntity::default()
    })
}

impl EntityBuilder {
    pub(crate) fn title(mut self, title: &str) -> Self {
        self.0.title = title.to_owned();
        self
    }

    pub(crate) fn description(mut self, description: &str) -> Self {
        self.0.description = Some(description.to_owned());
        self
    }

    pub(crate) fn vendor(mut self, name: &str) -> Self {
        self.0.vendor = Some(Vendor {
            name: name.to_owned(),
        });
        self
    }

    pub(crate) fn keywords(mut self, keywords: &[&str]) -> Self {
        self.0.search_keywords = keywords.iter().map(|k| (*k).to_owned()).collect();
        self
    }

    pub(crate) fn categories(mut self, categories: &[&str]) -> Self {
        self.0.categories = categories.iter().map(|c| (*c).to_owned()).collect();
        self
    }

    pub(crate) fn tags(mut self, tags: &[&str]) -> Self {
        self.0.tags = tags.iter().map(|t| (*t).to_owned()).collect();
        self
    }

    pub(crate) fn style(mut self, style: &str) -> Self {
        self.0.style = Some(style.to_owned());
        self
    }

    pub(crate) fn base_price(mut self, price: i64) -> Self {
        self.0.pricing.base_price = Some(Decimal::from(price));
        self
    }

    pub(crate) fn currency(mut self, currency: &str) -> Self {
        self.0.pricing.currency = currency.to_owned();
        self
    }

    pub(crate) fn variation_price(mut self, key: &str, price: i64) -> Self {
        self.0.variations.push(Variation {
            key: key.to_owned(),
            attributes: BTreeMap::new(),
            price: Some(Decimal::from(price)),
        });
        self
    }

    pub(crate) fn offer(mut self, seller_id: &str, seller_name: &str, price: i64) -> Self {
        let mut pricing_by_variation = BTreeMap::new();
        pricing_by_variation.insert(
            "default".to_owned(),
            OfferPrice {
                price: Decimal::from(price),
            },
        );
        self.0.offers.push(Offer {
            seller_id: seller_id.to_owned(),
            seller_name: seller_name.to_owned(),
            pricing_by_variation,
        });
        self
    }

    pub(crate) fn dimension(mut self, code: &str, label: &str, values: &[&str]) -> Self {
        self.0.variation_dimensions.push(Dimension {
            code: code.to_owned(),
            label: label.to_owned(),
            values: values
                .iter()
                .map(|v| DimensionValue {
                    value: (*v).to_owned(),
                    count: None,
                })
                .collect(),
        });
        self
    }

    pub(crate) fn build(self) -> CatalogEntity {
        self.0
    }
}

/// Materials A `[50,50]` tagged cement and B `[80,120]` tagged steel.
pub(crate) fn cement_and_steel() -> Vec<CatalogEntity> {
    vec![
        entity("A")
            .categories(&["Structural"])
            .tags(&["cement"])
            .base_price(50)
            .build(),
        entity("B")
            .categories(&["Structural"])
            .tags(&["steel"])
            .variation_price("short", 80)
            .variation_price("long", 120)
            .build(),
    ]
}
