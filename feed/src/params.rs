use url::form_urlencoded;

/// Query parameters accepted by the feed endpoint.
#[derive(Debug, Default, PartialEq)]
pub struct FeedParams {
    /// From `database_id`, falling back to `db`. Empty values count as missing.
    pub database_id: Option<String>,
    /// Account names to filter on, in request order
    pub comptes: Vec<String>,
    pub ping: bool,
}

impl FeedParams {
    pub fn from_query(query: Option<&str>) -> Self {
        let mut database_id: Option<String> = None;
        let mut db: Option<String> = None;
        let mut comptes_raw: Vec<String> = Vec::new();
        let mut ping = false;

        for (key, value) in form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            match key.as_ref() {
                "database_id" if database_id.is_none() => database_id = Some(value.into_owned()),
                "db" if db.is_none() => db = Some(value.into_owned()),
                // Repeated keys behave like a single comma separated value
                "comptes" => comptes_raw.push(value.into_owned()),
                "ping" => ping |= value == "1",
                _ => {}
            }
        }

        let database_id = [database_id, db]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty());

        FeedParams {
            database_id,
            comptes: split_accounts(&comptes_raw.join(",")),
            ping,
        }
    }
}

/// Splits a comma separated list of account names, dropping blank entries.
pub fn split_accounts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}
