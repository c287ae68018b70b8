//! Category registry: compiled-in built-ins plus user defined categories.

use std::{fmt, str::FromStr};

use crate::{
    EntryKind, LedgerError, ResultLedger,
    util::{name_key, normalize_display_name},
};

const DEFAULT_ICON: &str = "🏷️";

/// Which entry kinds a category can be used with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    Income,
    Expense,
    Both,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Both => "both",
        }
    }

    /// Returns `true` if an entry of `kind` may reference this category.
    pub fn accepts(self, kind: EntryKind) -> bool {
        matches!(
            (self, kind),
            (Self::Both, _)
                | (Self::Income, EntryKind::Income)
                | (Self::Expense, EntryKind::Expense)
        )
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "both" => Ok(Self::Both),
            other => Err(LedgerError::Validation(format!(
                "unknown category type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub kind: CategoryKind,
    pub is_custom: bool,
}

#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub icon: Option<String>,
    pub kind: CategoryKind,
}

#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub kind: Option<CategoryKind>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none() && self.kind.is_none()
    }

    /// The fields this patch touches, taken from the validated record.
    pub(crate) fn settled(&self, updated: &Category) -> CategoryPatch {
        CategoryPatch {
            name: self.name.as_ref().map(|_| updated.name.clone()),
            icon: self.icon.as_ref().map(|_| updated.icon.clone()),
            kind: self.kind.map(|_| updated.kind),
        }
    }
}

const BUILTINS: &[(&str, &str, &str, CategoryKind)] = &[
    ("salary", "Salary", "💼", CategoryKind::Income),
    ("freelance", "Freelance", "🧑‍💻", CategoryKind::Income),
    ("investment_income", "Investment income", "📈", CategoryKind::Income),
    ("gifts_received", "Gifts received", "🎁", CategoryKind::Income),
    ("food", "Food", "🍽️", CategoryKind::Expense),
    ("transport", "Transport", "🚌", CategoryKind::Expense),
    ("housing", "Housing", "🏠", CategoryKind::Expense),
    ("utilities", "Utilities", "💡", CategoryKind::Expense),
    ("health", "Health", "🩺", CategoryKind::Expense),
    ("entertainment", "Entertainment", "🎬", CategoryKind::Expense),
    ("shopping", "Shopping", "🛍️", CategoryKind::Expense),
    ("education", "Education", "🎓", CategoryKind::Expense),
    ("taxes", "Taxes", "🧾", CategoryKind::Expense),
    ("other", "Other", "📦", CategoryKind::Both),
];

/// Built-in categories shipped with the ledger. They can't be edited or removed.
pub fn builtin_categories() -> Vec<Category> {
    BUILTINS
        .iter()
        .map(|(id, name, icon, kind)| Category {
            id: (*id).to_string(),
            name: (*name).to_string(),
            icon: (*icon).to_string(),
            kind: *kind,
            is_custom: false,
        })
        .collect()
}

/// Built-ins first (in their fixed order), then custom categories in
/// insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            categories: builtin_categories(),
        }
    }
}

impl CategoryRegistry {
    /// Registry with the built-ins and the given custom categories.
    ///
    /// Records reusing a built-in id are dropped; every remaining record is
    /// flagged as custom.
    pub fn with_custom(custom: Vec<Category>) -> Self {
        let mut registry = Self::default();
        for mut category in custom {
            if registry.is_builtin(&category.id) {
                tracing::warn!(id = %category.id, "ignoring custom category shadowing a built-in");
                continue;
            }
            category.is_custom = true;
            registry.upsert(category);
        }
        registry
    }

    pub fn list(&self) -> &[Category] {
        &self.categories
    }

    pub fn custom(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|category| category.is_custom)
    }

    /// Categories an entry of `kind` may reference.
    pub fn selectable_for(&self, kind: EntryKind) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(move |category| category.kind.accepts(kind))
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|category| category.name.as_str())
    }

    fn is_builtin(&self, id: &str) -> bool {
        self.get(id).is_some_and(|category| !category.is_custom)
    }

    /// An entry of `kind` may reference `category_id` only if the category
    /// exists and accepts that kind.
    pub fn ensure_compatible(&self, category_id: &str, kind: EntryKind) -> ResultLedger<()> {
        let category = self.get(category_id).ok_or_else(|| {
            LedgerError::Validation(format!("unknown category: {category_id}"))
        })?;
        if !category.kind.accepts(kind) {
            return Err(LedgerError::Validation(format!(
                "category '{}' is for {} entries, got {kind}",
                category.name, category.kind
            )));
        }
        Ok(())
    }

    fn ensure_unique_name(&self, name: &str, except_id: Option<&str>) -> ResultLedger<()> {
        let key = name_key(name);
        if let Some(existing) = self
            .categories
            .iter()
            .filter(|category| Some(category.id.as_str()) != except_id)
            .find(|category| name_key(&category.name) == key)
        {
            return Err(LedgerError::Validation(format!(
                "category '{name}' already exists as '{}'",
                existing.name
            )));
        }
        Ok(())
    }

    /// Validate a new category and build the record with the given id.
    pub(crate) fn prepare_new(&self, id: String, new: NewCategory) -> ResultLedger<Category> {
        let name = normalize_display_name(&new.name, "category")?;
        self.ensure_unique_name(&name, None)?;
        Ok(Category {
            id,
            name,
            icon: normalize_icon(new.icon.as_deref()),
            kind: new.kind,
            is_custom: true,
        })
    }

    /// Validate a patch, returning the stored record and its patched version.
    pub(crate) fn prepare_update(
        &self,
        id: &str,
        patch: &CategoryPatch,
    ) -> ResultLedger<(Category, Category)> {
        let current = self.ensure_custom(id)?.clone();
        let mut updated = current.clone();
        if let Some(name) = &patch.name {
            let name = normalize_display_name(name, "category")?;
            self.ensure_unique_name(&name, Some(id))?;
            updated.name = name;
        }
        if let Some(icon) = &patch.icon {
            updated.icon = normalize_icon(Some(icon));
        }
        if let Some(kind) = patch.kind {
            updated.kind = kind;
        }
        Ok((current, updated))
    }

    /// Built-ins are rejected before anything else happens.
    pub(crate) fn ensure_custom(&self, id: &str) -> ResultLedger<&Category> {
        let category = self
            .get(id)
            .ok_or_else(|| LedgerError::KeyNotFound(id.to_string()))?;
        if !category.is_custom {
            return Err(LedgerError::BuiltinCategory(category.name.clone()));
        }
        Ok(category)
    }

    pub(crate) fn upsert(&mut self, category: Category) -> Option<Category> {
        match self.categories.iter_mut().find(|c| c.id == category.id) {
            Some(slot) => Some(std::mem::replace(slot, category)),
            None => {
                self.categories.push(category);
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Category> {
        let index = self
            .categories
            .iter()
            .position(|category| category.id == id && category.is_custom)?;
        Some(self.categories.remove(index))
    }
}

fn normalize_icon(icon: Option<&str>) -> String {
    icon.map(str::trim)
        .filter(|icon| !icon.is_empty())
        .unwrap_or(DEFAULT_ICON)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(id: &str, name: &str, kind: CategoryKind) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            icon: DEFAULT_ICON.to_string(),
            kind,
            is_custom: true,
        }
    }

    #[test]
    fn list_is_builtins_then_custom() {
        let registry =
            CategoryRegistry::with_custom(vec![custom("c1", "Coffee", CategoryKind::Expense)]);
        let list = registry.list();
        assert_eq!(list.len(), BUILTINS.len() + 1);
        assert!(list[..BUILTINS.len()].iter().all(|c| !c.is_custom));
        assert_eq!(list.last().unwrap().id, "c1");
    }

    #[test]
    fn custom_cannot_shadow_builtin() {
        let registry =
            CategoryRegistry::with_custom(vec![custom("food", "Mine", CategoryKind::Income)]);
        assert_eq!(registry.name_of("food"), Some("Food"));
        assert_eq!(registry.custom().count(), 0);
    }

    #[test]
    fn compatibility_follows_kind() {
        let registry = CategoryRegistry::default();
        assert!(registry.ensure_compatible("salary", EntryKind::Income).is_ok());
        assert!(matches!(
            registry.ensure_compatible("salary", EntryKind::Expense),
            Err(LedgerError::Validation(_))
        ));
        assert!(registry.ensure_compatible("other", EntryKind::Expense).is_ok());
        assert!(registry.ensure_compatible("other", EntryKind::Income).is_ok());
        assert!(matches!(
            registry.ensure_compatible("missing", EntryKind::Income),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn both_kind_is_selectable_for_both_directions() {
        let registry =
            CategoryRegistry::with_custom(vec![custom("c1", "Side gig", CategoryKind::Both)]);
        assert!(registry.selectable_for(EntryKind::Income).any(|c| c.id == "c1"));
        assert!(registry.selectable_for(EntryKind::Expense).any(|c| c.id == "c1"));
    }

    #[test]
    fn builtins_reject_updates() {
        let registry = CategoryRegistry::default();
        let patch = CategoryPatch {
            name: Some("Groceries".to_string()),
            ..Default::default()
        };
        assert_eq!(
            registry.prepare_update("food", &patch).unwrap_err(),
            LedgerError::BuiltinCategory("Food".to_string())
        );
        assert_eq!(
            registry.ensure_custom("food").unwrap_err(),
            LedgerError::BuiltinCategory("Food".to_string())
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let registry =
            CategoryRegistry::with_custom(vec![custom("c1", "Café", CategoryKind::Expense)]);
        let new = NewCategory {
            name: "  cafe ".to_string(),
            icon: None,
            kind: CategoryKind::Expense,
        };
        assert!(registry.prepare_new("c2".to_string(), new).is_err());

        let new = NewCategory {
            name: "FOOD".to_string(),
            icon: None,
            kind: CategoryKind::Expense,
        };
        assert!(registry.prepare_new("c3".to_string(), new).is_err());
    }

    #[test]
    fn rename_to_same_key_is_allowed() {
        let registry =
            CategoryRegistry::with_custom(vec![custom("c1", "Cafe", CategoryKind::Expense)]);
        let patch = CategoryPatch {
            name: Some("CAFE".to_string()),
            icon: Some(" ".to_string()),
            ..Default::default()
        };
        let (before, after) = registry.prepare_update("c1", &patch).unwrap();
        assert_eq!(before.name, "Cafe");
        assert_eq!(after.name, "CAFE");
        assert_eq!(after.icon, DEFAULT_ICON);
    }

    #[test]
    fn remove_never_touches_builtins() {
        let mut registry = CategoryRegistry::default();
        assert!(registry.remove("food").is_none());
        assert!(registry.get("food").is_some());
    }
}
