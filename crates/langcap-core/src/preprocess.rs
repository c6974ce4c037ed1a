use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    /// Clean up raw OCR output before it is looked up and stored
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // Unicode normalization (NFKC)
        let text: String = text.nfkc().collect();

        // OCR splits phrases across lines; fold every whitespace run into one space
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}
