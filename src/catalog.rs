//! Predefined picker values for the item forms.

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::models::Condition;

pub const CATEGORIES: &[&str] = &[
    "Linge de maison",
    "Cuisine",
    "Salle de bain",
    "Chambre",
    "Salon",
    "Électroménager",
    "Décoration",
    "Nettoyage",
    "Divers",
];

pub const LOCATIONS: &[&str] = &[
    "Entrée",
    "Salon",
    "Cuisine",
    "Grande chambre",
    "Dressing",
    "Petite chambre",
    "Salle de bain",
    "Toilettes",
    "Cave",
    "Buanderie",
    "Autres",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub categories: Vec<&'static str>,
    pub locations: Vec<&'static str>,
    pub conditions: Vec<String>,
}

pub fn catalog() -> Catalog {
    Catalog {
        categories: CATEGORIES.to_vec(),
        locations: LOCATIONS.to_vec(),
        conditions: Condition::iter().map(|c| c.to_string()).collect(),
    }
}
