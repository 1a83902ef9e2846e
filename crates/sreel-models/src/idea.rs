//! Idea configuration consumed by the scheduler.
//!
//! Idea CRUD itself lives outside this backend; the scheduler only needs
//! the persona x country combinations configured on an idea.

use serde::{Deserialize, Serialize};

use crate::id::{Country, IdeaId, Persona};

/// One persona configured on an idea, with its target countries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub persona: Persona,
    pub countries: Vec<Country>,
}

/// The slice of an idea the scheduler cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaConfig {
    pub id: IdeaId,
    #[serde(default)]
    pub personas: Vec<PersonaConfig>,
}

impl IdeaConfig {
    /// Every `(persona, country)` combination configured on this idea.
    pub fn combinations(&self) -> Vec<(Persona, Country)> {
        self.personas
            .iter()
            .flat_map(|p| {
                p.countries
                    .iter()
                    .map(move |c| (p.persona.clone(), c.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations_cartesian_per_persona() {
        let idea = IdeaConfig {
            id: IdeaId::from("idea-1"),
            personas: vec![
                PersonaConfig {
                    persona: Persona::from("founder"),
                    countries: vec![Country::from("us"), Country::from("de")],
                },
                PersonaConfig {
                    persona: Persona::from("coach"),
                    countries: vec![Country::from("us")],
                },
            ],
        };

        let combos = idea.combinations();
        assert_eq!(combos.len(), 3);
        assert!(combos.contains(&(Persona::from("founder"), Country::from("de"))));
        assert!(combos.contains(&(Persona::from("coach"), Country::from("us"))));
    }

    #[test]
    fn test_empty_idea_has_no_combinations() {
        let idea = IdeaConfig {
            id: IdeaId::from("idea-2"),
            personas: vec![],
        };
        assert!(idea.combinations().is_empty());
    }
}
