//! Site descriptor (`site.xml`) generation.
//!
//! The descriptor lists the site metadata and one `feature` element per
//! declared feature. It is serialized with two-space indentation and a UTF-8
//! XML declaration:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <site>
//!   <description name="My site" url="https://example.com">Nightly builds</description>
//!   <feature url="feature/feature.jar" id="com.example" version="1.0.0"/>
//! </site>
//! ```

use crate::config::{FeatureRef, SiteConfig, SiteMetadata};
use crate::error::{Result, SiteBuilderError};
use camino::{Utf8Path, Utf8PathBuf};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;

/// File name of the descriptor inside the staging directory.
pub const SITE_XML: &str = "site.xml";

/// Prefix of every feature `url` attribute.
///
/// Note the singular `feature/`: this is what the p2 site format expects in
/// the descriptor even though the staged directory is `features/`.
const FEATURE_URL_PREFIX: &str = "feature/";

/// A feature reference as it appears in `site.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureEntry {
    /// Relative URL, `feature/<basename>`.
    pub url: String,
    /// Feature identifier.
    pub id: String,
    /// Feature version.
    pub version: String,
}

impl FeatureEntry {
    fn from_feature(feature: &FeatureRef) -> Result<Self> {
        let file_name = feature
            .file_name()
            .ok_or_else(|| SiteBuilderError::MissingFileName {
                path: feature.path.clone(),
            })?;
        Ok(Self {
            url: format!("{FEATURE_URL_PREFIX}{file_name}"),
            id: feature.id.clone(),
            version: feature.version.clone(),
        })
    }
}

/// In-memory form of `site.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDescriptor {
    /// The `description` element.
    pub metadata: SiteMetadata,
    /// The `feature` elements, in declaration order.
    pub features: Vec<FeatureEntry>,
}

impl SiteDescriptor {
    /// Build the descriptor for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SiteBuilderError::MissingFileName`] if a feature path has
    /// no file name component.
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let features = config
            .features
            .iter()
            .map(FeatureEntry::from_feature)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            metadata: config.site.clone(),
            features,
        })
    }

    /// Serialize the descriptor to an indented XML document.
    ///
    /// # Errors
    ///
    /// Returns [`SiteBuilderError::Descriptor`] if the XML writer fails.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        write_event(&mut writer, Event::Start(BytesStart::new("site")))?;

        let mut description = BytesStart::new("description");
        description.push_attribute(("name", self.metadata.name.as_str()));
        description.push_attribute(("url", self.metadata.url.as_str()));
        write_event(&mut writer, Event::Start(description))?;
        write_event(
            &mut writer,
            Event::Text(BytesText::new(&self.metadata.description)),
        )?;
        write_event(&mut writer, Event::End(BytesEnd::new("description")))?;

        for feature in &self.features {
            let mut element = BytesStart::new("feature");
            element.push_attribute(("url", feature.url.as_str()));
            element.push_attribute(("id", feature.id.as_str()));
            element.push_attribute(("version", feature.version.as_str()));
            write_event(&mut writer, Event::Empty(element))?;
        }

        write_event(&mut writer, Event::End(BytesEnd::new("site")))?;

        let mut xml =
            String::from_utf8(writer.into_inner()).map_err(|e| SiteBuilderError::Descriptor {
                reason: e.to_string(),
            })?;
        xml.push('\n');
        Ok(xml)
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| SiteBuilderError::Descriptor {
            reason: e.to_string(),
        })
}

/// Write `site.xml` into `staging_dir` and return its path.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn write_site_xml(staging_dir: &Utf8Path, descriptor: &SiteDescriptor) -> Result<Utf8PathBuf> {
    let path = staging_dir.join(SITE_XML);
    fs::write(&path, descriptor.to_xml()?)?;
    log::debug!(
        "wrote {path} with {} feature(s)",
        descriptor.features.len()
    );
    Ok(path)
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
