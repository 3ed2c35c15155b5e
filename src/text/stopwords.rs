//! Stop-word lists for the two supported languages.
//!
//! The analyzer filters against the union of both lists, since scraped
//! articles arrive in either language without a reliable language tag.

pub const SPANISH: &[&str] = &[
    "a", "al", "algo", "algunas", "algunos", "ante", "antes", "como", "con", "contra", "cual",
    "cuando", "de", "del", "desde", "donde", "durante", "e", "el", "ella", "ellas", "ellos", "en",
    "entre", "era", "erais", "eran", "eras", "eres", "es", "esa", "esas", "ese", "eso", "esos",
    "esta", "estaba", "estado", "estamos", "estan", "estar", "estas", "este", "esto", "estos",
    "estoy", "está", "están", "estás", "fue", "fueron", "fui", "ha", "habia", "había", "han",
    "has", "hasta", "hay", "he", "la", "las", "le", "les", "lo", "los", "me", "mi", "mis",
    "mucho", "muchos", "muy", "más", "mí", "nada", "ni", "no", "nos", "nosotros", "nuestra",
    "nuestras", "nuestro", "nuestros", "o", "os", "otra", "otras", "otro", "otros", "para",
    "pero", "poco", "por", "porque", "que", "quien", "quienes", "qué", "se", "sea", "ser", "si",
    "sido", "siempre", "sin", "sobre", "son", "su", "sus", "suya", "suyo", "sí", "también",
    "tanto", "te", "tener", "tengo", "ti", "tiene", "tienen", "todo", "todos", "tu", "tus", "tú",
    "un", "una", "uno", "unos", "vosotros", "y", "ya", "yo", "él", "según", "tras", "cada",
    "puede", "pueden", "así", "dijo", "sólo", "solo", "hace", "ese", "aunque", "además",
];

pub const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "said", "same",
    "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves", "also", "may", "might", "must", "shall", "says", "according",
];
