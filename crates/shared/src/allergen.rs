use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum AllergenCategory {
    #[default]
    Food,
    /// Dust mites, pollen, animal dander
    Environmental,
    Insect,
    Drug,
    Other,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Allergen {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: AllergenCategory,
    #[serde(default)]
    pub scientific_name: Option<String>,
}

/// Allergens known to provoke the same immune response, e.g. the
/// tropomyosin family shared by shellfish and dust mites.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrossReactivityGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub protein_family: Option<String>,
    pub allergen_ids: Vec<String>,
}

/// Join row between an allergen and a cross-reactivity group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllergenCrossReactivity {
    pub group_id: String,
    pub allergen_id: String,
}

impl CrossReactivityGroup {
    /// Folds join rows into groups, keeping the order in which groups appear.
    pub fn from_rows(
        groups: impl IntoIterator<Item = (String, String, Option<String>)>,
        rows: impl IntoIterator<Item = AllergenCrossReactivity>,
    ) -> Vec<CrossReactivityGroup> {
        let mut groups = groups
            .into_iter()
            .map(|(id, name, protein_family)| CrossReactivityGroup {
                id,
                name,
                protein_family,
                allergen_ids: vec![],
            })
            .collect::<Vec<_>>();

        for row in rows {
            let Some(group) = groups.iter_mut().find(|g| g.id == row.group_id) else {
                continue;
            };

            if !group.allergen_ids.contains(&row.allergen_id) {
                group.allergen_ids.push(row.allergen_id);
            }
        }

        groups
    }
}

/// How an ingredient relates to an allergen.
#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum AllergenType {
    #[default]
    Contains,
    MayContain,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngredientAllergen {
    pub ingredient_id: String,
    pub allergen_id: String,
    #[serde(default)]
    pub allergen_type: AllergenType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_groups_members() {
        let groups = CrossReactivityGroup::from_rows(
            vec![
                ("g1".to_owned(), "Tropomyosin".to_owned(), None),
                ("g2".to_owned(), "Lipid transfer".to_owned(), None),
            ],
            vec![
                AllergenCrossReactivity {
                    group_id: "g1".to_owned(),
                    allergen_id: "shrimp".to_owned(),
                },
                AllergenCrossReactivity {
                    group_id: "g1".to_owned(),
                    allergen_id: "crab".to_owned(),
                },
                AllergenCrossReactivity {
                    group_id: "g1".to_owned(),
                    allergen_id: "crab".to_owned(),
                },
                AllergenCrossReactivity {
                    group_id: "missing".to_owned(),
                    allergen_id: "peach".to_owned(),
                },
            ],
        );

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].allergen_ids, vec!["shrimp", "crab"]);
        assert!(groups[1].allergen_ids.is_empty());
    }

    #[test]
    fn test_allergen_type_parses_from_storage() {
        assert_eq!(
            "MayContain".parse::<AllergenType>().unwrap(),
            AllergenType::MayContain
        );
        assert_eq!(AllergenType::Contains.to_string(), "Contains");
    }
}
