use std::collections::BTreeSet;

const PEST_KEYWORDS: [(&str, &str); 29] = [
    ("ant", "ants"),
    ("roach", "roaches"),
    ("cockroach", "roaches"),
    ("termite", "termites"),
    ("bed bug", "bed_bugs"),
    ("bedbug", "bed_bugs"),
    ("spider", "spiders"),
    ("mosquito", "mosquitoes"),
    ("flea", "fleas"),
    ("tick", "ticks"),
    ("rat", "rodents"),
    ("mouse", "rodents"),
    ("mice", "rodents"),
    ("rodent", "rodents"),
    ("wasp", "wasps"),
    ("hornet", "wasps"),
    ("bee", "bees"),
    ("fly", "flies"),
    ("silverfish", "silverfish"),
    ("beetle", "beetles"),
    ("cricket", "crickets"),
    ("centipede", "centipedes"),
    ("millipede", "millipedes"),
    ("moth", "moths"),
    ("gopher", "rodents"),
    ("mole", "rodents"),
    ("squirrel", "wildlife"),
    ("critter", "wildlife"),
    ("scorpion", "scorpions"),
];

const GENERIC_SERVICE_KEYWORDS: [&str; 5] =
    ["pest control", "exterminating", "bug", "insect", "wildlife"];

const CRITICAL_URGENCY_KEYWORDS: [&str; 6] =
    ["asap", "emergency", "immediately", "urgent", "help!!!", "help!!"];

pub const OTHER_PESTS: &str = "other_pests";

#[derive(Debug, Clone)]
pub struct PestSignal {
    pub pest_types: Vec<&'static str>,
    pub urgency: u8,
    pub confidence: f64,
}

pub fn extract(text: &str) -> PestSignal {
    let mut pest_types = extract_pest_types(text);
    if pest_types.is_empty() {
        pest_types = fallback_pest_types(text);
    }

    let urgency = calculate_urgency(text);
    let confidence = calculate_confidence(&pest_types, text);

    PestSignal {
        pest_types,
        urgency,
        confidence,
    }
}

pub fn extract_pest_types(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    let mut found = BTreeSet::new();

    for (keyword, pest_type) in PEST_KEYWORDS {
        if lower.contains(keyword) {
            found.insert(pest_type);
        }
    }

    found.into_iter().collect()
}

fn fallback_pest_types(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    if GENERIC_SERVICE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        vec![OTHER_PESTS]
    } else {
        Vec::new()
    }
}

pub fn calculate_urgency(text: &str) -> u8 {
    if text.is_empty() {
        return 5;
    }

    let lower = text.to_lowercase();

    if CRITICAL_URGENCY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return 9;
    }
    if lower.contains("infestation") {
        return 8;
    }
    if ["concerned", "worried"].iter().any(|kw| lower.contains(kw)) {
        return 7;
    }
    if ["problem", "issue", "seeing", "started"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        return 6;
    }
    if ["interested", "quote", "inspection"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        return 4;
    }

    5
}

pub fn calculate_confidence(pest_types: &[&str], text: &str) -> f64 {
    if pest_types.is_empty() {
        return 0.5;
    }
    if pest_types.len() >= 2 {
        return 0.85;
    }

    let lower = text.to_lowercase();

    if ["seeing", "have", "found", "nest", "infestation"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        return 0.90;
    }
    if ["problem", "issue"].iter().any(|kw| lower.contains(kw)) {
        return 0.80;
    }

    0.75
}
