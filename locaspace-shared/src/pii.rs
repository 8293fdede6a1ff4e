use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

const MASK: &str = "********";

/// Wrapper for payment details and other sensitive input.
///
/// Debug, Display and Serialize all print a fixed mask so that card data
/// entered in the payment step cannot leak through `tracing` fields or API
/// responses. Use [`Masked::expose`] where the raw value is really needed.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(T);

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_value() {
        let card = Masked::new("4111111111111111".to_string());
        assert_eq!(format!("{:?}", card), MASK);
        assert_eq!(card.to_string(), MASK);
        assert_eq!(serde_json::to_string(&card).unwrap(), "\"********\"");
        assert_eq!(card.expose(), "4111111111111111");
    }

    #[test]
    fn test_masked_deserializes_raw_value() {
        let cvv: Masked<String> = serde_json::from_str("\"123\"").unwrap();
        assert_eq!(cvv.into_inner(), "123");
    }
}
