mod common;

use std::collections::HashSet;

use common::{new_wizard, png};
use proptest::prelude::*;
use property_wizard::models::UnitKind;
use property_wizard::wizard::ImageStagingArea;
use property_wizard::{NavigationError, PropertyCatalog, StepId, Wizard};

const CATEGORIES: [&str; 7] = [
    "Residential",
    "Office",
    "Retail",
    "Hospitality",
    "Industrial",
    "Land",
    "Castle",
];

const SUB_CATEGORIES: [&str; 8] = [
    "Apartment",
    "Corporate Headquarters",
    "Storefront",
    "Hotel",
    "Warehouse",
    "Coworking Space",
    "Villa",
    "Moat",
];

/// User actions, applied to whatever step is current
#[derive(Debug, Clone)]
enum Action {
    Category(usize),
    SubCategory(usize),
    Title(usize),
    Units(u32),
    Address(bool),
    Coordinates(f64, f64),
    AddImage,
    RemoveFirstImage,
    Next,
    Back,
    GoTo(usize),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        2 => (0..CATEGORIES.len()).prop_map(Action::Category),
        2 => (0..SUB_CATEGORIES.len()).prop_map(Action::SubCategory),
        2 => (0usize..50).prop_map(Action::Title),
        1 => (0u32..20).prop_map(Action::Units),
        1 => any::<bool>().prop_map(Action::Address),
        1 => (-100.0f64..100.0, -200.0f64..200.0).prop_map(|(lat, lng)| Action::Coordinates(lat, lng)),
        2 => any::<bool>().prop_map(|add| if add { Action::AddImage } else { Action::RemoveFirstImage }),
        4 => Just(Action::Next),
        1 => Just(Action::Back),
        1 => (0..StepId::ALL.len()).prop_map(Action::GoTo),
    ]
}

/// Apply an action; edit errors are expected and ignored
fn apply(wizard: &mut Wizard, action: &Action) {
    match action {
        Action::Category(i) => {
            let _ = wizard.select_category(CATEGORIES[*i].into());
        }
        Action::SubCategory(i) => {
            let _ = wizard.select_sub_category(SUB_CATEGORIES[*i].into());
        }
        Action::Title(len) => {
            let _ = wizard.set_title("t".repeat(*len));
        }
        Action::Units(count) => {
            let _ = wizard.set_unit_count(UnitKind::Offices, *count);
        }
        Action::Address(set) => {
            let _ = wizard.set_address(if *set { "Drottninggatan 5" } else { "" });
        }
        Action::Coordinates(lat, lng) => {
            let _ = wizard.set_coordinates(*lat, *lng);
        }
        Action::AddImage => {
            let _ = wizard.add_images([png("photo.png")]);
        }
        Action::RemoveFirstImage => {
            if let Some(id) = wizard.staging().images().first().map(|i| i.client_id().to_string()) {
                let _ = wizard.remove_image(&id);
            }
        }
        Action::Next => {
            let _ = wizard.go_next();
        }
        Action::Back => {
            wizard.go_back();
        }
        Action::GoTo(i) => {
            let _ = wizard.go_to(StepId::ALL[*i]);
        }
    }
}

fn assert_category_consistency(wizard: &Wizard, catalog: &PropertyCatalog) -> Result<(), TestCaseError> {
    if let Some(sub) = &wizard.draft().sub_category {
        let category = wizard.draft().category.as_ref();
        prop_assert!(category.is_some());
        prop_assert!(catalog.contains_sub_category(category.unwrap(), sub));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn go_next_succeeds_iff_current_step_is_satisfied(actions in prop::collection::vec(action(), 0..60)) {
        let mut wizard = new_wizard();
        for action in &actions {
            apply(&mut wizard, action);

            let before = wizard.current_step();
            let satisfied = wizard.validate_current().valid;
            match wizard.go_next() {
                Ok(next) => {
                    prop_assert!(satisfied);
                    prop_assert!(next.index() > before.index());
                    prop_assert_eq!(wizard.current_step(), next);
                }
                Err(NavigationError::NoNextStep) => {
                    prop_assert_eq!(before, StepId::Preview);
                    prop_assert_eq!(wizard.current_step(), before);
                }
                Err(_) => {
                    prop_assert!(!satisfied);
                    prop_assert_eq!(wizard.current_step(), before);
                }
            }
        }
    }

    #[test]
    fn subcategory_always_belongs_to_category(actions in prop::collection::vec(action(), 0..80)) {
        let catalog = PropertyCatalog::standard();
        let mut wizard = new_wizard();
        for action in &actions {
            apply(&mut wizard, action);
            assert_category_consistency(&wizard, &catalog)?;
        }
    }

    #[test]
    fn current_step_is_always_unlocked(actions in prop::collection::vec(action(), 0..80)) {
        let mut wizard = new_wizard();
        for action in &actions {
            apply(&mut wizard, action);
            prop_assert!(wizard.unlocked_steps().contains(&wizard.current_step()));
        }
    }

    #[test]
    fn staged_client_ids_stay_unique(ops in prop::collection::vec((any::<bool>(), 0usize..8), 0..60)) {
        let mut area = ImageStagingArea::new(1024);
        for (add, index) in ops {
            if add {
                area.add_images([png("dup.png")]);
            } else {
                let before: Vec<String> = area.images().iter().map(|i| i.client_id().to_string()).collect();
                match before.get(index) {
                    Some(id) => prop_assert!(area.remove_image(id)),
                    None => {
                        prop_assert!(!area.remove_image("not-a-staged-id"));
                        let after: Vec<String> = area.images().iter().map(|i| i.client_id().to_string()).collect();
                        prop_assert_eq!(after, before);
                    }
                }
            }
            let ids: HashSet<&str> = area.images().iter().map(|i| i.client_id()).collect();
            prop_assert_eq!(ids.len(), area.len());
            prop_assert_eq!(area.registry().live_count(), area.len());
        }
    }
}
