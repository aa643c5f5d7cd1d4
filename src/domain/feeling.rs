use std::collections::HashMap;

/// Phrase used when the feeling key is missing altogether.
pub const UNKNOWN_FEELING_PHRASE: &str = "something new";

lazy_static::lazy_static! {
    /// Feeling keys written by the clients, mapped to the phrase shown in the notification.
    pub static ref FEELING_LABELS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();

        m.insert("angry", "angry");
        m.insert("anxious", "anxious");
        m.insert("bored", "bored");
        m.insert("calm", "calm");
        m.insert("euphoric", "euphoric");
        m.insert("flirty", "flirty");
        m.insert("happy", "happy");
        m.insert("headachy", "headachy");
        m.insert("horny", "horny");
        m.insert("hungry", "hungry");
        m.insert("hurt", "hurt");
        m.insert("inlove", "in love");
        m.insert("neutral", "neutral");
        m.insert("nervous", "nervous");
        m.insert("overstimulated", "overstimulated");
        m.insert("sad", "sad");
        m.insert("safe", "safe");
        m.insert("sick", "sick");
        m.insert("sleepy", "sleepy");
        m.insert("tired", "tired");
        m.insert("uncomfortable", "uncomfortable");
        m.insert("unsure", "unsure");
        m.insert("upset", "upset");
        m.insert("worried", "worried");

        m
    };
}

/// Label for a feeling key: the mapped phrase, else the raw key, else [`UNKNOWN_FEELING_PHRASE`].
pub fn feeling_label(feeling: Option<&str>) -> String {
    match feeling.filter(|key| !key.is_empty()) {
        Some(key) => FEELING_LABELS
            .get(key)
            .map_or_else(|| key.to_string(), |label| label.to_string()),
        None => UNKNOWN_FEELING_PHRASE.to_string(),
    }
}
