//! Tokenizer trait and document adapters

/// Splits raw text into tokens
pub trait Tokenizer {
    /// Tokens of `text`, in order
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Splits on Unicode whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_owned).collect()
    }
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Something the preprocessor can turn into tokens
///
/// Text goes through the tokenizer; token sequences are used as they are.
pub trait Document {
    /// Raw (not yet normalized) tokens
    fn raw_tokens(&self, tokenizer: &dyn Tokenizer) -> Vec<String>;
}

impl Document for str {
    fn raw_tokens(&self, tokenizer: &dyn Tokenizer) -> Vec<String> {
        tokenizer.tokenize(self)
    }
}

impl Document for String {
    fn raw_tokens(&self, tokenizer: &dyn Tokenizer) -> Vec<String> {
        tokenizer.tokenize(self)
    }
}

impl<S: AsRef<str>> Document for [S] {
    fn raw_tokens(&self, _tokenizer: &dyn Tokenizer) -> Vec<String> {
        self.iter().map(|token| token.as_ref().to_owned()).collect()
    }
}

impl<S: AsRef<str>> Document for Vec<S> {
    fn raw_tokens(&self, tokenizer: &dyn Tokenizer) -> Vec<String> {
        self.as_slice().raw_tokens(tokenizer)
    }
}

impl<S: AsRef<str>, const N: usize> Document for [S; N] {
    fn raw_tokens(&self, tokenizer: &dyn Tokenizer) -> Vec<String> {
        self.as_slice().raw_tokens(tokenizer)
    }
}

impl<T: Document + ?Sized> Document for &T {
    fn raw_tokens(&self, tokenizer: &dyn Tokenizer) -> Vec<String> {
        (**self).raw_tokens(tokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenizer() {
        let tokens = WhitespaceTokenizer.tokenize("  The quick\tbrown\nfox ");
        assert_eq!(tokens, vec!["The", "quick", "brown", "fox"]);
        assert!(WhitespaceTokenizer.tokenize("   ").is_empty());
    }

    #[test]
    fn test_closure_tokenizer() {
        let by_comma = |text: &str| -> Vec<String> { text.split(',').map(str::to_owned).collect() };
        assert_eq!(by_comma.tokenize("a,b"), vec!["a", "b"]);
    }

    #[test]
    fn test_text_documents_use_tokenizer() {
        assert_eq!("a b".raw_tokens(&WhitespaceTokenizer), vec!["a", "b"]);
        assert_eq!(String::from("c d").raw_tokens(&WhitespaceTokenizer), vec!["c", "d"]);
    }

    #[test]
    fn test_token_documents_bypass_tokenizer() {
        let doc = vec!["New York", "City"];
        assert_eq!(doc.raw_tokens(&WhitespaceTokenizer), vec!["New York", "City"]);
        assert_eq!(["x y"].raw_tokens(&WhitespaceTokenizer), vec!["x y"]);
        let owned = vec![String::from("z")];
        assert_eq!((&owned).raw_tokens(&WhitespaceTokenizer), vec!["z"]);
    }
}
