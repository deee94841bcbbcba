/// Static screen templates, looked up by id.

use crate::error::TermlinkError;

const BOOT: &[&str] = &[
    "Welcome to ROBCO Industries (TM) Termlink",
    ">SET TERMINAL/INQUIRE",
    "RIT-V300",
    ">SET FILE/PROTECTION=OWNER:RWED ACCOUNTS.F",
    ">SET HALT RESTART/MAINT",
    "Initializing Robco Industries(TM) MF Boot Agent v2.3.0",
    "RETROS BIOS",
    "RBIOS-4.02.08.00 52EE5.E7.E8",
    "Copyright 2201-2203 Robco Ind.",
    "Uppermem: 64 KB",
    "Root (5A8)",
    "Maintenance Mode",
    ">RUN DEBUG/ACCOUNTS.F",
];

const LOGIN: &[&str] = &[
    "> SET TERMINAL/LOGON",
    "USER AUTHENTICATION CHECK",
    "",
];

const HACKING: &[&str] = &[
    "Welcome to ROBCO Industries (TM) Termlink",
    "Password Required",
];

const LOCKED: &[&str] = &["Terminal locked", ""];

const ACCEPTED: &[&str] = &[
    "Welcome to ROBCO Industries (TM) Termlink",
    "\"We're in the business of happiness\"",
];

const TEMPLATES: &[(&str, &[&str])] = &[
    ("boot", BOOT),
    ("login", LOGIN),
    ("hacking", HACKING),
    ("locked", LOCKED),
    ("accepted", ACCEPTED),
];

pub fn template(id: &str) -> Result<&'static [&'static str], TermlinkError> {
    TEMPLATES.iter()
        .find(|(name, _)| *name == id)
        .map(|(_, lines)| *lines)
        .ok_or_else(|| TermlinkError::TemplateMissing(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_templates_resolve() {
        for id in ["boot", "login", "hacking", "locked", "accepted"] {
            assert!(!template(id).unwrap().is_empty(), "{id}");
        }
        assert_eq!(template("hacking").unwrap()[1], "Password Required");
    }

    #[test]
    fn unknown_template_is_an_error() {
        match template("intro") {
            Err(TermlinkError::TemplateMissing(id)) => assert_eq!(id, "intro"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
