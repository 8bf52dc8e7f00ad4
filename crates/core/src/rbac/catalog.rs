//! Static role catalog with inheritance
//!
//! Roles form a directed graph through `inherits_from`. The graph is checked
//! and flattened once, when the catalog is built: duplicate ids, references
//! to unknown roles and cycles are rejected, and every role's effective
//! permission set is precomputed.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use super::matcher::matches_permission;

/// A role as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Higher is more privileged.
    pub level: u32,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, alias = "inheritsFrom")]
    pub inherits_from: Vec<String>,
}

impl RoleDefinition {
    pub fn new(id: impl Into<String>, level: u32) -> Self {
        Self {
            id: id.into(),
            name: None,
            level,
            permissions: Vec::new(),
            inherits_from: Vec::new(),
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn permissions(mut self, permissions: &[&str]) -> Self {
        self.permissions = permissions.iter().map(|p| (*p).to_string()).collect();
        self
    }

    #[must_use]
    pub fn inherits(mut self, parents: &[&str]) -> Self {
        self.inherits_from = parents.iter().map(|p| (*p).to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleCatalogError {
    #[error("role {0} is defined more than once")]
    DuplicateRole(String),

    #[error("role {role} inherits from unknown role {parent}")]
    UnknownParent { role: String, parent: String },

    #[error("role inheritance cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("invalid role catalog: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    roles: BTreeMap<String, RoleDefinition>,
    effective: BTreeMap<String, BTreeSet<String>>,
}

impl RoleCatalog {
    /// Build a catalog, validating the inheritance graph.
    ///
    /// # Errors
    /// Returns [`RoleCatalogError`] on duplicate ids, unknown parents or
    /// inheritance cycles.
    pub fn new(
        definitions: impl IntoIterator<Item = RoleDefinition>,
    ) -> Result<Self, RoleCatalogError> {
        let mut roles = BTreeMap::new();
        for definition in definitions {
            if roles.contains_key(&definition.id) {
                return Err(RoleCatalogError::DuplicateRole(definition.id));
            }
            roles.insert(definition.id.clone(), definition);
        }

        for role in roles.values() {
            if let Some(parent) = role.inherits_from.iter().find(|p| !roles.contains_key(*p)) {
                return Err(RoleCatalogError::UnknownParent {
                    role: role.id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        let effective = resolve(&roles)?;
        debug!(roles = roles.len(), "role catalog resolved");
        Ok(Self { roles, effective })
    }

    /// Parse a JSON array of role definitions.
    ///
    /// # Errors
    /// Returns `RoleCatalogError::Parse` for invalid JSON, otherwise the
    /// errors of [`RoleCatalog::new`].
    pub fn from_json(json: &str) -> Result<Self, RoleCatalogError> {
        let definitions: Vec<RoleDefinition> =
            serde_json::from_str(json).map_err(|e| RoleCatalogError::Parse(e.to_string()))?;
        Self::new(definitions)
    }

    /// The built-in hierarchy: `super_admin`, and
    /// `admin -> manager -> user -> guest`.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_roles()).unwrap_or_else(|err| {
            error!(error = %err, "built-in role catalog failed to resolve");
            Self::default()
        })
    }

    /// Own plus inherited permissions of `role_id`. Unknown roles have none.
    #[must_use]
    pub fn get_role_permissions(&self, role_id: &str) -> BTreeSet<String> {
        self.effective.get(role_id).cloned().unwrap_or_default()
    }

    /// Union of the effective permissions of every listed role.
    pub fn permissions_for_roles<S: AsRef<str>>(&self, roles: &[S]) -> BTreeSet<String> {
        roles
            .iter()
            .filter_map(|role| self.effective.get(role.as_ref()))
            .flat_map(|permissions| permissions.iter().cloned())
            .collect()
    }

    /// Whether any of `roles` grants `required`, wildcards included.
    pub fn roles_grant<S: AsRef<str>>(&self, roles: &[S], required: &str) -> bool {
        roles
            .iter()
            .filter_map(|role| self.effective.get(role.as_ref()))
            .flatten()
            .any(|permission| matches_permission(permission, required))
    }

    #[must_use]
    pub fn role(&self, role_id: &str) -> Option<&RoleDefinition> {
        self.roles.get(role_id)
    }

    #[must_use]
    pub fn level(&self, role_id: &str) -> Option<u32> {
        self.roles.get(role_id).map(|role| role.level)
    }

    /// Whether `role_id` is at least as privileged as `minimum`. Unknown
    /// roles on either side compare as `false`.
    #[must_use]
    pub fn is_at_least(&self, role_id: &str, minimum: &str) -> bool {
        match (self.level(role_id), self.level(minimum)) {
            (Some(level), Some(required)) => level >= required,
            _ => false,
        }
    }

    pub fn role_ids(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Mark {
    Visiting,
    Done,
}

fn resolve(
    roles: &BTreeMap<String, RoleDefinition>,
) -> Result<BTreeMap<String, BTreeSet<String>>, RoleCatalogError> {
    let mut marks = HashMap::new();
    let mut effective = BTreeMap::new();
    let mut path = Vec::new();
    for id in roles.keys() {
        visit(id, roles, &mut marks, &mut effective, &mut path)?;
    }
    Ok(effective)
}

/// Depth-first post-order walk; parents are resolved before children.
fn visit<'a>(
    id: &'a str,
    roles: &'a BTreeMap<String, RoleDefinition>,
    marks: &mut HashMap<&'a str, Mark>,
    effective: &mut BTreeMap<String, BTreeSet<String>>,
    path: &mut Vec<&'a str>,
) -> Result<(), RoleCatalogError> {
    match marks.get(id) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = path.iter().position(|step| *step == id).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|s| (*s).to_string()).collect();
            cycle.push(id.to_string());
            return Err(RoleCatalogError::Cycle(cycle));
        }
        None => {}
    }

    let Some(role) = roles.get(id) else {
        return Ok(());
    };

    marks.insert(id, Mark::Visiting);
    path.push(id);

    let mut permissions: BTreeSet<String> = role.permissions.iter().cloned().collect();
    for parent in &role.inherits_from {
        visit(parent, roles, marks, effective, path)?;
        if let Some(inherited) = effective.get(parent) {
            permissions.extend(inherited.iter().cloned());
        }
    }

    path.pop();
    marks.insert(id, Mark::Done);
    effective.insert(id.to_string(), permissions);
    Ok(())
}

fn builtin_roles() -> Vec<RoleDefinition> {
    vec![
        RoleDefinition::new("super_admin", 100).named("Super Administrator").permissions(&["*"]),
        RoleDefinition::new("admin", 80)
            .named("Administrator")
            .permissions(&["users:*", "roles:*", "settings:*", "audit:read", "tenants:read"])
            .inherits(&["manager"]),
        RoleDefinition::new("manager", 50)
            .named("Manager")
            .permissions(&["users:read", "users:update", "teams:*", "reports:*"])
            .inherits(&["user"]),
        RoleDefinition::new("user", 10)
            .named("User")
            .permissions(&["profile:read", "profile:update", "sessions:read", "sessions:revoke"])
            .inherits(&["guest"]),
        RoleDefinition::new("guest", 0).named("Guest").permissions(&["public:read"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_inherits_transitively() {
        let catalog = RoleCatalog::builtin();
        assert_eq!(catalog.len(), 5);

        let admin = catalog.get_role_permissions("admin");
        for lower in ["manager", "user", "guest"] {
            let inherited = catalog.get_role_permissions(lower);
            assert!(!inherited.is_empty());
            assert!(inherited.is_subset(&admin), "admin is missing permissions of {lower}");
        }
        assert!(admin.contains("users:*"));
        assert!(admin.contains("public:read"));
    }

    #[test]
    fn shared_ancestors_are_counted_once() {
        let catalog = RoleCatalog::new([
            RoleDefinition::new("base", 0).permissions(&["a:read"]),
            RoleDefinition::new("left", 1).permissions(&["b:read"]).inherits(&["base"]),
            RoleDefinition::new("right", 1).permissions(&["a:read"]).inherits(&["base"]),
            RoleDefinition::new("top", 2).inherits(&["left", "right"]),
        ])
        .unwrap();
        let top = catalog.get_role_permissions("top");
        assert_eq!(top.into_iter().collect::<Vec<_>>(), vec!["a:read", "b:read"]);
    }

    #[test]
    fn unknown_role_has_no_permissions() {
        assert!(RoleCatalog::builtin().get_role_permissions("nobody").is_empty());
    }

    #[test]
    fn rejects_cycles() {
        let result = RoleCatalog::new([
            RoleDefinition::new("a", 1).inherits(&["b"]),
            RoleDefinition::new("b", 1).inherits(&["c"]),
            RoleDefinition::new("c", 1).inherits(&["a"]),
        ]);
        match result {
            Err(RoleCatalogError::Cycle(path)) => {
                assert_eq!(path.first(), path.last());
                assert_eq!(path.len(), 4);
            }
            other => panic!("expected cycle, got {other:?}"),
        }

        let self_loop = RoleCatalog::new([RoleDefinition::new("a", 1).inherits(&["a"])]);
        assert_eq!(
            self_loop.unwrap_err(),
            RoleCatalogError::Cycle(vec!["a".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn rejects_unknown_parents_and_duplicates() {
        assert_eq!(
            RoleCatalog::new([RoleDefinition::new("a", 1).inherits(&["ghost"])]).unwrap_err(),
            RoleCatalogError::UnknownParent { role: "a".into(), parent: "ghost".into() }
        );
        assert_eq!(
            RoleCatalog::new([RoleDefinition::new("a", 1), RoleDefinition::new("a", 2)])
                .unwrap_err(),
            RoleCatalogError::DuplicateRole("a".into())
        );
    }

    #[test]
    fn roles_grant_uses_wildcards() {
        let catalog = RoleCatalog::builtin();
        assert!(catalog.roles_grant(&["admin"], "users:delete"));
        assert!(catalog.roles_grant(&["super_admin"], "billing:refund"));
        assert!(!catalog.roles_grant(&["guest"], "users:read"));
        assert!(catalog.roles_grant(&["guest", "user"], "sessions:revoke"));
        assert!(!catalog.roles_grant::<&str>(&[], "public:read"));
    }

    #[test]
    fn levels() {
        let catalog = RoleCatalog::builtin();
        assert!(catalog.is_at_least("admin", "manager"));
        assert!(!catalog.is_at_least("user", "manager"));
        assert!(!catalog.is_at_least("ghost", "guest"));
        assert_eq!(catalog.level("super_admin"), Some(100));
    }

    #[test]
    fn parses_json_definitions() {
        let catalog = RoleCatalog::from_json(
            r#"[
                {"id": "viewer", "level": 1, "permissions": ["docs:read"]},
                {
                    "id": "editor",
                    "level": 2,
                    "permissions": ["docs:write"],
                    "inheritsFrom": ["viewer"]
                }
            ]"#,
        )
        .unwrap();
        assert!(catalog.get_role_permissions("editor").contains("docs:read"));
        assert!(matches!(RoleCatalog::from_json("{"), Err(RoleCatalogError::Parse(_))));
    }
}
