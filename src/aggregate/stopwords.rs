//! Hungarian stopwords and the phrase list used by the trend exclusion.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Lowercase Hungarian stopwords, also bound as a `text[]` argument by the
/// co-occurrence and phrase-trend queries.
pub const HUNGARIAN_STOPWORDS: &[&str] = &[
    "a", "abban", "ahhoz", "ahogy", "ahol", "aki", "akik", "akkor", "alatt", "amely",
    "amelyek", "amelyekben", "amelyeket", "amelyet", "amelynek", "ami", "amikor",
    "amit", "amolyan", "amíg", "annak", "arra", "arról", "az", "azok", "azon",
    "azonban", "azt", "aztán", "azután", "azzal", "azért", "azóta", "be", "belül",
    "benne", "bizonyos", "bár", "cikk", "cikkek", "cikkeket", "csak", "de", "e",
    "ebben", "eddig", "egy", "egyes", "egyetlen", "egyik", "egyre", "egyéb", "egész",
    "ehhez", "ekkor", "el", "ellen", "első", "elég", "elő", "először", "előtt",
    "emilyen", "ennek", "erre", "ez", "ezek", "ezen", "ezt", "ezzel", "ezért",
    "ezúttal", "fel", "felé", "hanem", "hiszen", "hogy", "hogyan", "ide", "igen",
    "ill", "ill.", "illetve", "ilyen", "ilyenkor", "is", "ismét", "itt",
    "jobban", "jó", "jól", "kell", "kellett", "keressünk", "keresztül", "ki", "kívül",
    "között", "közül", "legalább", "legyen", "lehet", "lehetett", "lenne", "lenni",
    "lesz", "lett", "maga", "magyar", "magát", "majd", "meg", "megint", "mellett",
    "mellé", "mely", "melyek", "mert", "mi", "mikor", "milyen", "minden", "mindenki",
    "mindent", "mindig", "mint", "mintha", "mit", "mivel", "miért", "most", "már",
    "más", "másik", "másként", "másnap", "mások", "még", "mégis", "míg", "nagy",
    "nagyobb", "nagyon", "ne", "nekem", "neki", "nem", "nincs", "néha", "néhány",
    "nélkül", "nézzük", "oda", "olyan", "ott", "pedig", "persze", "rá", "s", "saját",
    "sem", "semmi", "sok", "sokat", "sokkal", "szemben", "szerint", "szinte",
    "számára", "talán", "tehát", "teljes", "tovább", "továbbá", "több", "túl",
    "ugyanis", "utolsó", "után", "utána", "vagy", "vagyis", "vagyok", "valaki",
    "valami", "valamint", "való", "van", "vannak", "vele", "videó", "vissza",
    "viszont", "volna", "volt", "voltak", "voltam", "voltunk", "által", "általában",
    "át", "én", "éppen", "és", "így", "össze", "úgy", "új", "újabb", "újra", "ő", "ők",
    "őket", "őt",
];

/// Two-word public-figure names removed from phrase trends on request.
pub const PUBLIC_FIGURE_PHRASES: &[&str] = &[
    "orbán viktor",
    "magyar péter",
    "karácsony gergely",
    "szijjártó péter",
    "gulyás gergely",
    "rogán antal",
    "novák katalin",
    "sulyok tamás",
    "donald trump",
    "joe biden",
    "vlagyimir putyin",
    "volodimir zelenszkij",
];

static HUNGARIAN: Lazy<Stopwords> = Lazy::new(|| Stopwords::new(HUNGARIAN_STOPWORDS));

/// Case-insensitive stopword membership.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
        Stopwords {
            words: words.iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    pub fn hungarian() -> &'static Stopwords {
        &HUNGARIAN
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

pub fn is_stopword(word: &str) -> bool {
    HUNGARIAN.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_membership() {
        assert!(is_stopword("és"));
        assert!(is_stopword("Hogy"));
        assert!(is_stopword("ÉS"));
        assert!(!is_stopword("kormány"));
    }

    #[test]
    fn test_list_is_lowercase_and_unique() {
        let unique: HashSet<_> = HUNGARIAN_STOPWORDS.iter().collect();
        assert_eq!(unique.len(), HUNGARIAN_STOPWORDS.len());
        assert_eq!(Stopwords::hungarian().len(), HUNGARIAN_STOPWORDS.len());
        for word in HUNGARIAN_STOPWORDS {
            assert_eq!(word.to_lowercase(), *word);
        }
    }

    #[test]
    fn test_custom_set() {
        let set = Stopwords::new(&["The"]);
        assert!(set.contains("the"));
        assert!(set.contains("THE"));
        assert!(!set.contains("cat"));
        assert!(Stopwords::default().is_empty());
    }

    #[test]
    fn test_public_figures_are_bigrams() {
        for phrase in PUBLIC_FIGURE_PHRASES {
            assert_eq!(phrase.split(' ').count(), 2, "{}", phrase);
            assert_eq!(phrase.to_lowercase(), *phrase);
        }
    }
}
