/// Redis key-construction helpers.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    /// Key holding the JSON array of one snapshot collection.
    pub fn collection(&self, collection: &str) -> String {
        format!("{}:snapshot:{}", self.prefix, collection)
    }

    /// Pub/sub channel the event relay publishes on.
    pub fn events_channel(&self) -> String {
        format!("{}:events", self.prefix)
    }
}
