//! Tests for features, properties and the configuration they map to.

use xml_pull::{Config, ConfigError, Error, EventType, Feature, Property, PullParser};

use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let r = PullParser::new();
    assert_eq!(r.config(), &Config::default());
    assert!(!r.feature(Feature::ProcessNamespaces));
    assert!(!r.feature(Feature::XmlRoundtrip));
    assert!(!r.feature(Feature::NamesInterned));
    assert!(!r.feature(Feature::ProcessDocdecl));
    assert_eq!(r.property(Property::Location), None);
    assert_eq!(r.property(Property::XmlDeclVersion), None);
}

#[test]
fn features_by_key() {
    let mut r = PullParser::from_str("<p:a xmlns:p='urn:p'/>");
    let feature = "http://xmlpull.org/v1/doc/features.html#process-namespaces"
        .parse::<Feature>()
        .unwrap();
    r.set_feature(feature, true).unwrap();
    assert!(r.config().process_namespaces);
    r.next().unwrap();
    assert_eq!(r.namespace_uri(), Some("urn:p"));

    assert_eq!(
        "http://xmlpull.org/v1/doc/features.html#validation".parse::<Feature>(),
        Err(ConfigError::UnknownFeature(
            "http://xmlpull.org/v1/doc/features.html#validation".into()
        ))
    );
}

#[test]
fn unsupported_features() {
    let mut r = PullParser::new();
    assert!(matches!(
        r.set_feature(Feature::NamesInterned, true),
        Err(Error::Config(ConfigError::Unsupported(_)))
    ));
    assert!(matches!(
        r.set_feature(Feature::ProcessDocdecl, true),
        Err(Error::Config(ConfigError::Unsupported(_)))
    ));
    r.set_feature(Feature::NamesInterned, false).unwrap();
    r.set_feature(Feature::ProcessDocdecl, false).unwrap();
}

#[test]
fn namespaces_only_before_start() {
    let mut r = PullParser::from_str("<a/>");
    r.set_feature(Feature::ProcessNamespaces, true).unwrap();
    r.set_feature(Feature::ProcessNamespaces, false).unwrap();
    r.next().unwrap();
    assert!(matches!(
        r.set_feature(Feature::ProcessNamespaces, true),
        Err(Error::Config(ConfigError::NamespacesAfterStart))
    ));

    // a new input starts a new document
    r.set_input_str("<b/>");
    r.set_feature(Feature::ProcessNamespaces, true).unwrap();
}

#[test]
fn roundtrip_can_change_any_time() {
    let mut r = PullParser::from_str("<a>1\r\n<b/>2\r\n</a>");
    r.next_token().unwrap();
    assert_eq!(r.next_token().unwrap(), EventType::Text);
    assert_eq!(r.text(), Some("1\n"));
    r.set_feature(Feature::XmlRoundtrip, true).unwrap();
    r.next_token().unwrap();
    r.next_token().unwrap();
    assert_eq!(r.next_token().unwrap(), EventType::Text);
    assert_eq!(r.text(), Some("2\r\n"));
}

#[test]
fn config_mut() {
    let mut r = PullParser::from_str("<x:a xmlns:x='urn:x'/>");
    r.config_mut().process_namespaces = true;
    r.next().unwrap();
    assert_eq!(r.name(), Some("a"));
    assert_eq!(r.prefix(), Some("x"));
}

mod properties {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn location_in_diagnostics() {
        let mut r = PullParser::from_str("<a>&x;</a>");
        r.set_property(Property::Location, Some("doc.xml".into())).unwrap();
        assert_eq!(r.property(Property::Location), Some("doc.xml"));
        r.next().unwrap();
        match r.next() {
            Err(Error::IllFormed(d)) => {
                assert!(d.position.ends_with(" doc.xml@1:7"), "{}", d.position)
            }
            x => panic!("Expected `Err(IllFormed(_))`, but got {:?}", x),
        }
        // location survives a new input
        r.set_input_str("<b/>");
        assert_eq!(r.property(Property::Location), Some("doc.xml"));
        assert_eq!(r.position_description(), "START_DOCUMENT doc.xml@1:1");
    }

    #[test]
    fn xml_declaration() {
        let mut r = PullParser::from_str("<?xml version='1.0' standalone='yes'?><a/>");
        r.next().unwrap();
        assert_eq!(r.property(Property::XmlDeclVersion), Some("1.0"));
        assert_eq!(r.property(Property::XmlDeclStandalone), Some("yes"));
        assert_eq!(
            r.property(Property::XmlDeclContent),
            Some(" version='1.0' standalone='yes'")
        );
    }

    #[test]
    fn read_only() {
        let mut r = PullParser::new();
        assert!(matches!(
            r.set_property(Property::XmlDeclVersion, Some("1.1".into())),
            Err(Error::Config(ConfigError::ReadOnlyProperty(_)))
        ));
        assert!(matches!(
            r.set_property(Property::XmlDeclStandalone, None),
            Err(Error::Config(ConfigError::ReadOnlyProperty(_)))
        ));
    }

    #[test]
    fn by_key() {
        let property = "http://xmlpull.org/v1/doc/properties.html#location"
            .parse::<Property>()
            .unwrap();
        assert_eq!(property, Property::Location);
        assert_eq!(property.key().parse::<Property>(), Ok(Property::Location));
    }
}
