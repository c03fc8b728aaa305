//! Typed recipe search queries.
//!
//! A [`RecipeQuery`] holds optional predicates that are AND-combined, plus
//! the pagination window. An absent predicate matches everything. The
//! visibility scope is not part of the query; callers inject it separately
//! so it can never be forgotten or overridden by user input.
//!
//! Both the data page and the total count are derived from ONE where-clause
//! assembly, so the two can never disagree about which rows match.

use rusqlite::types::Value;

use ladle_core::{Difficulty, PageRequest, RecipeId, UserId};
use ladle_policy::VisibilityScope;

/// Optional, AND-combined search predicates plus a pagination window.
#[derive(Debug, Clone)]
pub struct RecipeQuery {
    /// Exact recipe id.
    pub id: Option<RecipeId>,
    /// Substring match against the recipe title.
    pub title: Option<String>,
    /// Substring match against the category.
    pub category: Option<String>,
    /// Substring match against any child ingredient name.
    pub ingredient_name: Option<String>,
    /// Exact difficulty match. Unrecognized spellings never reach this
    /// field; parsing them fails with a validation error upstream.
    pub difficulty: Option<Difficulty>,
    /// Restrict to one owner's recipes.
    pub owner: Option<UserId>,
    pub page: PageRequest,
}

impl RecipeQuery {
    /// An unfiltered query over the given page window.
    pub fn new(page: PageRequest) -> Self {
        Self {
            id: None,
            title: None,
            category: None,
            ingredient_name: None,
            difficulty: None,
            owner: None,
            page,
        }
    }

    pub fn id(mut self, id: RecipeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn ingredient_name(mut self, name: impl Into<String>) -> Self {
        self.ingredient_name = Some(name.into());
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Wrap a substring needle in containment wildcards.
///
/// Wildcard characters in the needle are NOT escaped; a literal `%` or `_`
/// in the search text acts as a wildcard. Known limitation carried until an
/// ESCAPE clause is added.
fn contains(needle: &str) -> Value {
    Value::Text(format!("%{}%", needle))
}

/// Build the shared where-clause and its positional parameters.
pub(crate) fn where_clause(query: &RecipeQuery, scope: VisibilityScope) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(id) = query.id {
        clauses.push("r.id = ?".to_string());
        params.push(Value::Integer(id.get()));
    }

    if let Some(title) = &query.title {
        clauses.push("r.title LIKE ?".to_string());
        params.push(contains(title));
    }

    if let Some(category) = &query.category {
        clauses.push("r.category LIKE ?".to_string());
        params.push(contains(category));
    }

    if let Some(name) = &query.ingredient_name {
        clauses.push("i.name LIKE ?".to_string());
        params.push(contains(name));
    }

    if let Some(difficulty) = query.difficulty {
        clauses.push("r.difficulty = ?".to_string());
        params.push(Value::Text(difficulty.as_str().to_string()));
    }

    if let Some(owner) = query.owner {
        clauses.push("r.owner_id = ?".to_string());
        params.push(Value::Integer(owner.get()));
    }

    match scope {
        VisibilityScope::Unrestricted => {}
        VisibilityScope::CallerScoped(user_id) => {
            clauses.push("(r.is_private = 0 OR r.owner_id = ?)".to_string());
            params.push(Value::Integer(user_id.get()));
        }
        VisibilityScope::PublicOnly => {
            clauses.push("r.is_private = 0".to_string());
        }
    }

    let sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    (sql, params)
}

/// The data query over the shared where-clause. The ingredients join exists
/// only for the ingredient-name predicate; GROUP BY collapses the fan-out
/// so a recipe with several matching children appears once.
pub(crate) fn data_sql(where_sql: &str) -> String {
    format!(
        "SELECT r.id, r.owner_id, r.title, r.description, r.difficulty, r.category, \
                r.tags, r.is_private, r.views, r.likes, r.version, r.created_at, r.updated_at \
         FROM recipes r LEFT JOIN ingredients i ON i.recipe_id = r.id\
         {where_sql} \
         GROUP BY r.id ORDER BY r.id LIMIT ? OFFSET ?"
    )
}

/// The count query over the same where-clause.
pub(crate) fn count_sql(where_sql: &str) -> String {
    format!(
        "SELECT COUNT(DISTINCT r.id) \
         FROM recipes r LEFT JOIN ingredients i ON i.recipe_id = r.id\
         {where_sql}"
    )
}
