//! Derived views over the todo list. Nothing here mutates its input.

use std::collections::BTreeSet;

use crate::entities::{FilterSpec, StatusFilter, Todo, UserFilter};

/// Applies status, then user, then title search. Input order is kept.
pub fn filter_todos<'a>(
    todos: &'a [Todo],
    filters: &FilterSpec,
    favorites: &[i64],
) -> Vec<&'a Todo> {
    // a blank query means no search; otherwise it is matched as typed
    let searching = !filters.search_query.trim().is_empty();
    let query = filters.search_query.to_lowercase();

    todos
        .iter()
        .filter(|todo| match filters.status {
            StatusFilter::All => true,
            StatusFilter::Completed => todo.completed,
            StatusFilter::Uncompleted => !todo.completed,
            StatusFilter::Favorites => favorites.contains(&todo.id),
        })
        .filter(|todo| match filters.user_id {
            UserFilter::All => true,
            UserFilter::User(user_id) => todo.user_id == user_id,
        })
        .filter(|todo| !searching || todo.title.to_lowercase().contains(&query))
        .collect()
}

/// Distinct owners of the listed todos, ascending.
pub fn unique_user_ids(todos: &[Todo]) -> Vec<i64> {
    todos
        .iter()
        .map(|todo| todo.user_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
