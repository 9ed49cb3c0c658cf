#[cfg(test)]
mod tests {
    use keel_core::{Error, parse_date};
    use time::Month;

    #[test]
    fn valid_dates() {
        let date = parse_date("22/04/1985").expect("Could not parse 22/04/1985");
        assert_eq!(date.year(), 1985);
        assert_eq!(date.month(), Month::April);
        assert_eq!(date.day(), 22);

        for (text, (year, month, day)) in [
            ("01/01/2000", (2000, Month::January, 1)),
            ("31/12/1999", (1999, Month::December, 31)),
            ("29/02/2020", (2020, Month::February, 29)),
            ("30/06/0001", (1, Month::June, 30)),
        ] {
            let date = parse_date(text).expect(&format!("Could not parse {text}"));
            assert_eq!((date.year(), date.month(), date.day()), (year, month, day));
        }
    }

    #[test]
    fn malformed_dates() {
        for text in [
            "",
            "22-04-1985",
            "22.04.1985",
            "1985/04/22",
            "aa/04/1985",
            "22/Apr/1985",
            "22/13/1985",
            "00/04/1985",
            "32/01/1985",
            "31/04/1985",
            "29/02/2019",
            "22/04/1985 ",
            "22/04/85",
            "22/04/+1985",
            "22/04/-1985",
            "+2/04/1985",
            "22/+4/1985",
            "22/04/１９８５",
        ] {
            let result = parse_date(text);
            assert!(
                matches!(result, Err(Error::DateFormat { ref input, .. }) if input == text),
                "Expected `{text}` to be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn signed_year() {
        let Err(Error::DateFormat { input, source }) = parse_date("22/04/-1985") else {
            panic!("A signed year must be rejected");
        };
        assert_eq!(input, "22/04/-1985");
        assert!(source.to_string().contains("year"), "{source}");
    }

    #[test]
    fn error_kind() {
        let error = parse_date("22-04-1985").unwrap_err();
        assert_eq!(error.kind(), "date_format");
        assert!(error.to_string().contains("22-04-1985"));
    }
}
