use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

/// A directory entry as served by `{base}/users`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Address,
    pub company: Company,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.username
        } else {
            &self.name
        }
    }

    /// Username compares case-insensitively, phone compares exactly.
    pub fn matches(&self, credentials: &Credentials) -> bool {
        self.username.to_lowercase() == credentials.username.to_lowercase()
            && self.phone == credentials.phone_number
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    // the create echo leaves this out
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub user_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Uncompleted,
    Favorites,
}

/// Either one user's todos or everyone's. Serialized as the id or `"all"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawUserFilter", into = "RawUserFilter")]
pub enum UserFilter {
    #[default]
    All,
    User(i64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawUserFilter {
    Id(i64),
    Keyword(String),
}

impl TryFrom<RawUserFilter> for UserFilter {
    type Error = String;

    fn try_from(raw: RawUserFilter) -> Result<Self, Self::Error> {
        match raw {
            RawUserFilter::Id(id) => Ok(UserFilter::User(id)),
            RawUserFilter::Keyword(keyword) if keyword == "all" => Ok(UserFilter::All),
            RawUserFilter::Keyword(other) => other
                .parse()
                .map(UserFilter::User)
                .map_err(|_| format!("expected a user id or \"all\", got {other:?}")),
        }
    }
}

impl From<UserFilter> for RawUserFilter {
    fn from(filter: UserFilter) -> Self {
        match filter {
            UserFilter::All => RawUserFilter::Keyword("all".into()),
            UserFilter::User(id) => RawUserFilter::Id(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub status: StatusFilter,
    pub user_id: UserFilter,
    pub search_query: String,
}

/// Partial filter change; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
    pub status: Option<StatusFilter>,
    pub user_id: Option<UserFilter>,
    pub search_query: Option<String>,
}

impl FilterSpec {
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(user_id) = update.user_id {
            self.user_id = user_id;
        }
        if let Some(search_query) = update.search_query {
            self.search_query = search_query;
        }
    }
}
