use super::{CategoryId, SubCategoryId};

/// A category and the subcategories declared under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDefinition {
    pub id: CategoryId,
    pub sub_categories: Vec<SubCategoryId>,
}

impl CategoryDefinition {
    pub fn new(id: &str, sub_categories: &[&str]) -> Self {
        Self {
            id: CategoryId::new(id),
            sub_categories: sub_categories.iter().map(|s| SubCategoryId::new(*s)).collect(),
        }
    }
}

/// Recognized property categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyCatalog {
    categories: Vec<CategoryDefinition>,
}

impl PropertyCatalog {
    pub fn new(categories: Vec<CategoryDefinition>) -> Self {
        Self { categories }
    }

    /// The categories offered by the property-manager portal
    pub fn standard() -> Self {
        Self::new(vec![
            CategoryDefinition::new(
                "Residential",
                &["Apartment", "Single-Family Home", "Townhouse", "Villa", "Condominium"],
            ),
            CategoryDefinition::new(
                "Office",
                &[
                    "Corporate Headquarters",
                    "Coworking Space",
                    "Executive Suite",
                    "Business Center",
                ],
            ),
            CategoryDefinition::new(
                "Retail",
                &["Shopping Center", "Storefront", "Showroom", "Restaurant"],
            ),
            CategoryDefinition::new(
                "Hospitality",
                &["Hotel", "Resort", "Guest House", "Serviced Apartment"],
            ),
            CategoryDefinition::new(
                "Industrial",
                &["Warehouse", "Factory", "Logistics Hub", "Cold Storage"],
            ),
            CategoryDefinition::new("Land", &[]),
        ])
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    pub fn category(&self, id: &CategoryId) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn is_known(&self, id: &CategoryId) -> bool {
        self.category(id).is_some()
    }

    /// Subcategories of `id`, empty for unknown categories
    pub fn sub_categories(&self, id: &CategoryId) -> &[SubCategoryId] {
        self.category(id)
            .map(|c| c.sub_categories.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_sub_categories(&self, id: &CategoryId) -> bool {
        !self.sub_categories(id).is_empty()
    }

    pub fn contains_sub_category(&self, category: &CategoryId, sub: &SubCategoryId) -> bool {
        self.sub_categories(category).contains(sub)
    }
}

impl Default for PropertyCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn land_declares_no_subcategories() {
        let catalog = PropertyCatalog::standard();
        assert!(catalog.is_known(&"Land".into()));
        assert!(!catalog.has_sub_categories(&"Land".into()));
        assert!(catalog.has_sub_categories(&"Office".into()));
    }

    #[test]
    fn unknown_category_has_empty_subcategory_set() {
        let catalog = PropertyCatalog::standard();
        assert!(catalog.sub_categories(&"Castle".into()).is_empty());
        assert!(!catalog.contains_sub_category(&"Castle".into(), &"Tower".into()));
    }
}
