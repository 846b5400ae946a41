#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

/// Parses `NAME=NUMBER` into a forecast input. The name may itself contain `=`;
/// the last one separates the number.
pub fn parse_value_pair(raw: &str) -> std::result::Result<(String, f64), String> {
    let (name, number) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=NUMBER, got '{}'", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", raw));
    }

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|e| format!("invalid number '{}': {}", number.trim(), e))?;
    if !value.is_finite() {
        return Err(format!("forecast input for '{}' must be finite", name));
    }

    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_pair() {
        assert_eq!(parse_value_pair("X=5").unwrap(), ("X".to_string(), 5.0));
        assert_eq!(
            parse_value_pair(" Precio unitario = -2.5 ").unwrap(),
            ("Precio unitario".to_string(), -2.5)
        );
        assert_eq!(parse_value_pair("a=b=1").unwrap(), ("a=b".to_string(), 1.0));
        assert!(parse_value_pair("X").is_err());
        assert!(parse_value_pair("=3").is_err());
        assert!(parse_value_pair("X=abc").is_err());
        assert!(parse_value_pair("X=inf").is_err());
    }
}
