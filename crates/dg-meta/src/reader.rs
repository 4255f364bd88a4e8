//! Whole-file entry points.

use std::path::Path;

use dg_xml::{load_document, parse_document, Element};
use nalgebra::Vector2;
use tracing::{debug, trace};

use crate::attitude::{AttitudeMetadata, AttitudeXml};
use crate::ephemeris::{EphemerisMetadata, EphemerisXml};
use crate::geometric::{GeometricMetadata, GeometricXml};
use crate::image::{ImageMetadata, ImageXml};
use crate::rpc::{reconcile_rpc, RpcModel, RpcXml};
use crate::{MetaError, ReadOptions};

/// Every record of one metadata file.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorMetadata {
    pub geometric: GeometricMetadata,
    pub ephemeris: EphemerisMetadata,
    pub attitude: AttitudeMetadata,
    pub image: ImageMetadata,
    pub rpc: RpcModel,
}

/// Read all five records from the metadata file at `path`.
///
/// Any failure after the existence check is reported as
/// [`MetaError::InvalidFile`] carrying the file name.
pub fn read_xml(path: impl AsRef<Path>, options: &ReadOptions) -> Result<SensorMetadata, MetaError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MetaError::Argument(format!(
            "XML file \"{}\" does not exist",
            path.display()
        )));
    }
    let name = path.display().to_string();
    let document = load_document(path).map_err(|err| MetaError::from(err).in_file(&name))?;
    read_root(document.root(), options).map_err(|err| err.in_file(name))
}

/// Same as [`read_xml`] for an in-memory document; `name` labels errors.
pub fn parse_xml_str(
    name: &str,
    xml: &str,
    options: &ReadOptions,
) -> Result<SensorMetadata, MetaError> {
    parse_document(xml)
        .map_err(MetaError::from)
        .and_then(|document| read_root(document.root(), options))
        .map_err(|err| err.in_file(name))
}

/// Image size `(columns, rows)` of the metadata file at `path`.
pub fn xml_image_size(path: impl AsRef<Path>) -> Result<Vector2<u32>, MetaError> {
    let meta = read_xml(path, &ReadOptions::default())?;
    Ok(meta.image.image_size())
}

/// Read only the RPC model of the file at `path`, accepting either layout.
pub fn read_rpc_file(path: impl AsRef<Path>) -> Result<RpcModel, MetaError> {
    let path = path.as_ref();
    let document =
        load_document(path).map_err(|err| MetaError::from(err).in_file(path.display().to_string()))?;
    reconcile_rpc(document.root())
}

/// Same as [`read_rpc_file`] for an in-memory document.
pub fn read_rpc_str(name: &str, xml: &str) -> Result<RpcModel, MetaError> {
    let document = parse_document(xml).map_err(|err| MetaError::from(err).in_file(name))?;
    reconcile_rpc(document.root())
}

fn read_root(root: &Element, options: &ReadOptions) -> Result<SensorMetadata, MetaError> {
    let mut geo = GeometricXml::new();
    let mut eph = EphemerisXml::with_policy(options.index_policy);
    let mut att = AttitudeXml::with_policy(options.index_policy);
    let mut img = ImageXml::new();
    let mut rpc = RpcXml::new();

    for block in root.children() {
        match block.name() {
            "GEO" => geo.parse(block)?,
            "EPH" => eph.parse(block)?,
            "ATT" => att.parse(block)?,
            "IMD" => img.parse(block)?,
            "RPB" => rpc.parse(block)?,
            other => trace!(tag = other, "skipping top-level block"),
        }
    }

    let meta = SensorMetadata {
        geometric: geo.finish()?,
        ephemeris: eph.finish()?,
        attitude: att.finish()?,
        image: img.finish()?,
        rpc: rpc.finish()?,
    };
    debug!(
        root = root.name(),
        ephemeris = meta.ephemeris.len(),
        attitude = meta.attitude.len(),
        "read sensor metadata"
    );
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::rpc::Datum;
    use std::path::PathBuf;

    fn temp_path(stem: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{stem}-{:016x}.xml", fastrand::u64(..)))
    }

    #[test]
    fn reads_every_block() {
        let meta = parse_xml_str("scene.xml", &fixtures::full_document(), &ReadOptions::default())
            .expect("read document");
        assert_eq!(meta.image.sat_id, "WV01");
        assert_eq!(meta.ephemeris.len(), 3);
        assert_eq!(meta.attitude.len(), 2);
        assert_eq!(meta.geometric.detector_origin, Vector2::new(1.5, -2.25));
        assert_eq!(meta.rpc.datum(), Datum::Wgs84);
        assert_eq!(meta.rpc.xy_offset(), Vector2::new(17590.0, 17500.0));
    }

    #[test]
    fn lower_errors_are_wrapped_with_file_name() {
        let text = fixtures::full_document().replace("<NUMPOINTS>3</NUMPOINTS>", "<NUMPOINTS>4</NUMPOINTS>");
        let err = parse_xml_str("scene.xml", &text, &ReadOptions::default()).unwrap_err();
        match &err {
            MetaError::InvalidFile { path, source } => {
                assert_eq!(path, "scene.xml");
                assert!(matches!(**source, MetaError::Io(_)));
            }
            other => panic!("expected InvalidFile, got {other:?}"),
        }
        assert!(err.to_string().contains("scene.xml"));
    }

    #[test]
    fn huge_declared_counts_are_io_errors() {
        let huge = format!("{}", usize::MAX);
        for (from, to) in [
            ("<NUMPOINTS>3</NUMPOINTS>", format!("<NUMPOINTS>{huge}</NUMPOINTS>")),
            ("<NUMPOINTS>2</NUMPOINTS>", format!("<NUMPOINTS>{huge}</NUMPOINTS>")),
            ("<NUMTLC>2</NUMTLC>", format!("<NUMTLC>{huge}</NUMTLC>")),
        ] {
            let text = fixtures::full_document().replace(from, &to);
            let err = parse_xml_str("scene.xml", &text, &ReadOptions::default()).unwrap_err();
            assert!(matches!(err, MetaError::InvalidFile { .. }), "{from}: {err:?}");
            assert!(matches!(err.root_cause(), MetaError::Io(_)), "{from}: {err:?}");
        }
    }

    #[test]
    fn missing_block_is_incomplete() {
        let text = fixtures::without(&fixtures::full_document(), "ATT");
        let err = parse_xml_str("scene.xml", &text, &ReadOptions::default()).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            MetaError::Incomplete { object: "ATT", .. }
        ));
    }

    #[test]
    fn broken_document_is_invalid_file() {
        let err = parse_xml_str("broken.xml", "<isd><IMD></isd>", &ReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, MetaError::InvalidFile { .. }));
        assert!(matches!(err.root_cause(), MetaError::Xml(_)));
    }

    #[test]
    fn permissive_option_reaches_list_readers() {
        let text = fixtures::full_document().replace("<EPHEMLIST>2 ", "<EPHEMLIST>3 ");
        let strict = parse_xml_str("scene.xml", &text, &ReadOptions::default()).unwrap_err();
        assert!(matches!(strict.root_cause(), MetaError::Argument(_)));
        parse_xml_str("scene.xml", &text, &ReadOptions::permissive()).expect("permissive read");
    }

    #[test]
    fn file_entry_points() {
        let path = temp_path("dg-meta-scene");
        std::fs::write(&path, fixtures::full_document()).expect("write fixture");
        let size = xml_image_size(&path).expect("image size");
        assert_eq!(size, Vector2::new(35180, 35000));
        let rpc = read_rpc_file(&path).expect("rpc");
        assert_eq!(rpc.xy_scale(), Vector2::new(17591.0, 17501.0));
        std::fs::remove_file(&path).ok();

        let missing = temp_path("dg-meta-missing");
        assert!(matches!(
            read_xml(&missing, &ReadOptions::default()),
            Err(MetaError::Argument(_))
        ));
    }

    #[test]
    fn rpc_string_reader_falls_back() {
        let xml = format!(
            "<Dimap_Document>{}</Dimap_Document>",
            fixtures::rational_function_model_block()
        );
        let model = read_rpc_str("pleiades.xml", &xml).expect("alternate layout");
        assert_eq!(model.xy_offset(), Vector2::new(4999.5, 2999.5));

        let err = read_rpc_str("empty.xml", "<Dimap_Document/>").unwrap_err();
        assert!(matches!(err, MetaError::NotFound(_)));
    }
}
