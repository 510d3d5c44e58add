use crate::engine::error::ConfigurationError;
use rapier3d::prelude::*;
use std::collections::HashMap;

/// Interned material tag, stored in each collider's user data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) u32);

impl MaterialId {
    /// Recover the material id from a collider's user data
    pub fn from_user_data(user_data: u128) -> Self {
        Self(user_data as u32)
    }

    /// Get the raw id
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Friction and restitution applied when two tagged materials touch
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRule {
    pub material_a: String,
    pub material_b: String,
    pub friction: Real,
    pub restitution: Real,
}

impl ContactRule {
    pub fn new(
        material_a: impl Into<String>,
        material_b: impl Into<String>,
        friction: Real,
        restitution: Real,
    ) -> Self {
        Self {
            material_a: material_a.into(),
            material_b: material_b.into(),
            friction,
            restitution,
        }
    }
}

/// Contact properties of one material pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactProperties {
    pub friction: Real,
    pub restitution: Real,
}

/// Material names and the pairwise contact rules between them
///
/// Installed as the physics hooks of the world, so every solver contact
/// between two ruled materials picks up the rule's friction and restitution.
#[derive(Debug, Default)]
pub struct ContactRules {
    /// Name to id mapping
    materials: HashMap<String, MaterialId>,

    /// Rules keyed by the unordered pair (smaller id first)
    rules: HashMap<(MaterialId, MaterialId), ContactProperties>,
}

impl ContactRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a material name
    pub fn material(&mut self, name: &str) -> MaterialId {
        if let Some(&id) = self.materials.get(name) {
            return id;
        }
        let id = MaterialId(self.materials.len() as u32);
        self.materials.insert(name.to_string(), id);
        id
    }

    /// Look up a material without interning it
    pub fn lookup(&self, name: &str) -> Option<MaterialId> {
        self.materials.get(name).copied()
    }

    /// Register a rule for an unordered material pair
    ///
    /// A second registration for the same pair replaces the first and is
    /// reported as an error, so accidental re-registration never goes unseen.
    pub fn register(&mut self, rule: ContactRule) -> Result<(), ConfigurationError> {
        match self.set(&rule) {
            None => {
                log::debug!(
                    "Contact rule ({}, {}): friction {} restitution {}",
                    rule.material_a,
                    rule.material_b,
                    rule.friction,
                    rule.restitution
                );
                Ok(())
            }
            Some(_) => {
                log::warn!(
                    "Contact rule ({}, {}) registered again, keeping the new values",
                    rule.material_a,
                    rule.material_b
                );
                Err(ConfigurationError::DuplicateContactRule {
                    a: rule.material_a,
                    b: rule.material_b,
                })
            }
        }
    }

    /// Store a rule, returning the properties it replaced
    pub fn set(&mut self, rule: &ContactRule) -> Option<ContactProperties> {
        let a = self.material(&rule.material_a);
        let b = self.material(&rule.material_b);
        let props = ContactProperties {
            friction: rule.friction,
            restitution: rule.restitution,
        };
        self.rules.insert(pair_key(a, b), props)
    }

    /// Rule for a pair of material ids, if any
    pub fn get(&self, a: MaterialId, b: MaterialId) -> Option<ContactProperties> {
        self.rules.get(&pair_key(a, b)).copied()
    }

    /// Rule for a pair of material names, if any
    pub fn get_by_name(&self, a: &str, b: &str) -> Option<ContactProperties> {
        let a = self.lookup(a)?;
        let b = self.lookup(b)?;
        self.get(a, b)
    }
}

fn pair_key(a: MaterialId, b: MaterialId) -> (MaterialId, MaterialId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl PhysicsHooks for ContactRules {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let a = MaterialId::from_user_data(context.colliders[context.collider1].user_data);
        let b = MaterialId::from_user_data(context.colliders[context.collider2].user_data);

        if let Some(props) = self.get(a, b) {
            for contact in context.solver_contacts.iter_mut() {
                contact.friction = props.friction;
                contact.restitution = props.restitution;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_interning() {
        let mut rules = ContactRules::new();
        let floor = rules.material("floor");
        let ball = rules.material("ball");

        assert_ne!(floor, ball);
        assert_eq!(rules.material("floor"), floor);
        assert_eq!(rules.lookup("ball"), Some(ball));
        assert_eq!(rules.lookup("dice"), None);
    }

    #[test]
    fn test_rule_is_unordered() {
        let mut rules = ContactRules::new();
        rules
            .register(ContactRule::new("floor", "ball", 0.1, 0.7))
            .unwrap();

        let forward = rules.get_by_name("floor", "ball").unwrap();
        let backward = rules.get_by_name("ball", "floor").unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.friction, 0.1);
        assert_eq!(forward.restitution, 0.7);
    }

    #[test]
    fn test_duplicate_rule_keeps_last_and_reports() {
        let mut rules = ContactRules::new();
        assert!(rules.register(ContactRule::new("M", "M", 0.2, 0.1)).is_ok());

        let second = rules.register(ContactRule::new("M", "M", 0.9, 0.1));

        assert!(matches!(
            second,
            Err(ConfigurationError::DuplicateContactRule { .. })
        ));
        assert_eq!(rules.get_by_name("M", "M").unwrap().friction, 0.9);
        assert_eq!(rules.rules.len(), 1);
    }

    #[test]
    fn test_reversed_pair_counts_as_duplicate() {
        let mut rules = ContactRules::new();
        rules.register(ContactRule::new("a", "b", 0.1, 0.0)).unwrap();
        assert!(rules.register(ContactRule::new("b", "a", 0.5, 0.0)).is_err());
        assert_eq!(rules.get_by_name("a", "b").unwrap().friction, 0.5);
    }

    #[test]
    fn test_set_replaces_quietly() {
        let mut rules = ContactRules::new();
        assert_eq!(rules.set(&ContactRule::new("floor", "ball", 0.1, 0.7)), None);

        let replaced = rules.set(&ContactRule::new("ball", "floor", 0.1, 0.2));

        assert_eq!(replaced.map(|p| p.restitution), Some(0.7));
        assert_eq!(rules.get_by_name("floor", "ball").unwrap().restitution, 0.2);
    }

    #[test]
    fn test_user_data_roundtrip() {
        let mut rules = ContactRules::new();
        let id = rules.material("dice");
        assert_eq!(MaterialId::from_user_data(id.as_u32() as u128), id);
    }
}
