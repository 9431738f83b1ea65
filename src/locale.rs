use std::fmt;

use clap::ValueEnum;

/// Geolocation restriction, sent as `gl`.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Country {
    #[default]
    UnitedStates,
    UnitedKingdom,
    Canada,
    Australia,
    India,
}

impl Country {
    pub fn code(self) -> &'static str {
        match self {
            Country::UnitedStates => "US",
            Country::UnitedKingdom => "GB",
            Country::Canada => "CA",
            Country::Australia => "AU",
            Country::India => "IN",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Country::UnitedStates => "United States",
            Country::UnitedKingdom => "United Kingdom",
            Country::Canada => "Canada",
            Country::Australia => "Australia",
            Country::India => "India",
        }
    }
}

/// Result language restriction, sent as `lr`.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Chinese,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "lang_en",
            Language::Spanish => "lang_es",
            Language::French => "lang_fr",
            Language::German => "lang_de",
            Language::Chinese => "lang_zh",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Chinese => "Chinese",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Locale {
    pub country: Country,
    pub language: Language,
}

impl Locale {
    pub fn new(country: Country, language: Language) -> Self {
        Self { country, language }
    }

    pub fn gl(&self) -> &'static str {
        self.country.code()
    }

    pub fn lr(&self) -> &'static str {
        self.language.code()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}), {} ({})",
            self.country.label(),
            self.gl(),
            self.language.label(),
            self.lr()
        )
    }
}

/// Table of selectable options for `--list-locales`.
pub fn describe_options() -> String {
    let mut out = String::from("Countries:\n");
    for country in Country::value_variants() {
        out.push_str(&format!(
            "  {:<16} {:<16} {}\n",
            value_name(country),
            country.label(),
            country.code()
        ));
    }
    out.push_str("Languages:\n");
    for language in Language::value_variants() {
        out.push_str(&format!(
            "  {:<16} {:<16} {}\n",
            value_name(language),
            language.label(),
            language.code()
        ));
    }
    out
}

fn value_name(v: &impl ValueEnum) -> String {
    v.to_possible_value()
        .map(|p| p.get_name().to_string())
        .unwrap_or_default()
}
