//! XML fixtures shared by the unit tests.

use dg_xml::{parse_document, Element};

pub const IMD_BLOCK: &str = r#"
<IMD>
    <VERSION>AA</VERSION>
    <IMAGE>
        <SATID>WV01</SATID>
        <SCANDIRECTION>Forward</SCANDIRECTION>
        <TLCTIME>2009-10-31T07:28:36.123456Z</TLCTIME>
        <NUMTLC>2</NUMTLC>
        <TLCLISTList>
            <TLCLIST>0 0.000000000000000e+00</TLCLIST>
            <TLCLIST>35000 1.750000000000000e+00</TLCLIST>
        </TLCLISTList>
        <FIRSTLINETIME>2009-10-31T07:28:36.123456Z</FIRSTLINETIME>
        <AVGLINERATE>2.000000000000000e+04</AVGLINERATE>
    </IMAGE>
    <BAND_P><TDILEVEL>16</TDILEVEL></BAND_P>
    <NUMROWS>35000</NUMROWS>
    <NUMCOLUMNS>35180</NUMCOLUMNS>
</IMD>
"#;

pub const GEO_BLOCK: &str = r#"
<GEO>
    <EFFECTIVETIME>2009-09-01T00:00:00.000000Z</EFFECTIVETIME>
    <PRINCIPAL_DISTANCE><PD>8.836200000000000e+03</PD></PRINCIPAL_DISTANCE>
    <OPTICAL_DISTORTION><POLYORDER>-1</POLYORDER></OPTICAL_DISTORTION>
    <PERSPECTIVE_CENTER><CX>1.25</CX><CY>-0.5</CY><CZ>0.75</CZ></PERSPECTIVE_CENTER>
    <CAMERA_ATTITUDE><QCS1>0.1</QCS1><QCS2>0.2</QCS2><QCS3>0.3</QCS3><QCS4>0.9</QCS4></CAMERA_ATTITUDE>
    <DETECTOR_MOUNTING>
        <BAND_P>
            <DETECTOR_ARRAY>
                <DETARRID>P</DETARRID>
                <DETORIGINX>1.5</DETORIGINX>
                <DETORIGINY>-2.25</DETORIGINY>
                <DETROTANGLE>0.0</DETROTANGLE>
                <DETPITCH>8.0e-03</DETPITCH>
            </DETECTOR_ARRAY>
        </BAND_P>
    </DETECTOR_MOUNTING>
</GEO>
"#;

pub const EPH_BLOCK: &str = r#"
<EPH>
    <STARTTIME>2009-10-31T07:28:30.000000Z</STARTTIME>
    <NUMPOINTS>3</NUMPOINTS>
    <TIMEINTERVAL>2.000000000000000e-02</TIMEINTERVAL>
    <EPHEMLISTList>
        <EPHEMLIST>1 6.0e6 1.0e5 2.0e5 -1.0 7.5e3 2.0 1e-6 0 0 1e-6 0 1e-6</EPHEMLIST>
        <EPHEMLIST>2 6.1e6 1.1e5 2.1e5 -1.1 7.6e3 2.1 2e-6 0 0 2e-6 0 2e-6</EPHEMLIST>
        <EPHEMLIST>3 6.2e6 1.2e5 2.2e5 -1.2 7.7e3 2.2 3e-6 0 0 3e-6 0 3e-6</EPHEMLIST>
    </EPHEMLISTList>
</EPH>
"#;

pub const ATT_BLOCK: &str = r#"
<ATT>
    <STARTTIME>2009-10-31T07:28:30.000000Z</STARTTIME>
    <NUMPOINTS>2</NUMPOINTS>
    <TIMEINTERVAL>2.000000000000000e-02</TIMEINTERVAL>
    <ATTLISTList>
        <ATTLIST>1 0.1 0.2 0.3 0.9 1 2 3 4 5 6 7 8 9 10</ATTLIST>
        <ATTLIST>2 0.0 0.0 0.0 1.0 0 0 0 0 0 0 0 0 0 0</ATTLIST>
    </ATTLISTList>
</ATT>
"#;

/// 20 coefficients `base, base + 1, ..., base + 19`.
pub fn coefficients(base: f64) -> Vec<f64> {
    (0..20).map(|i| base + i as f64).collect()
}

fn joined(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Native `RPB` block with LINENUM = 100.., LINEDEN = 200.., SAMPNUM = 300..,
/// SAMPDEN = 400.. and offsets `(sample, line) = (17590, 17500)`.
pub fn rpb_block() -> String {
    format!(
        r#"
<RPB>
    <SATID>WV01</SATID>
    <IMAGE>
        <ERRBIAS>5.1</ERRBIAS>
        <LINEOFFSET>17500</LINEOFFSET>
        <SAMPOFFSET>17590</SAMPOFFSET>
        <LATOFFSET>-33.5</LATOFFSET>
        <LONGOFFSET>151.2</LONGOFFSET>
        <HEIGHTOFFSET>50</HEIGHTOFFSET>
        <LINESCALE>17501</LINESCALE>
        <SAMPSCALE>17591</SAMPSCALE>
        <LATSCALE>0.08</LATSCALE>
        <LONGSCALE>0.09</LONGSCALE>
        <HEIGHTSCALE>500</HEIGHTSCALE>
        <LINENUMCOEFList><LINENUMCOEF>{}</LINENUMCOEF></LINENUMCOEFList>
        <LINEDENCOEFList><LINEDENCOEF>{}</LINEDENCOEF></LINEDENCOEFList>
        <SAMPNUMCOEFList><SAMPNUMCOEF>{}</SAMPNUMCOEF></SAMPNUMCOEFList>
        <SAMPDENCOEFList><SAMPDENCOEF>{}</SAMPDENCOEF></SAMPDENCOEFList>
    </IMAGE>
</RPB>
"#,
        joined(&coefficients(100.0)),
        joined(&coefficients(200.0)),
        joined(&coefficients(300.0)),
        joined(&coefficients(400.0)),
    )
}

/// Alternate `Rational_Function_Model` block with the same coefficients as
/// [`rpb_block`] and offsets `(sample, line) = (5000.5, 3000.5)`.
pub fn rational_function_model_block() -> String {
    let mut inverse = String::new();
    for (prefix, base) in [
        ("SAMP_NUM_COEFF", 300.0),
        ("SAMP_DEN_COEFF", 400.0),
        ("LINE_NUM_COEFF", 100.0),
        ("LINE_DEN_COEFF", 200.0),
    ] {
        for (i, value) in coefficients(base).iter().enumerate() {
            inverse.push_str(&format!("<{prefix}_{n}>{value}</{prefix}_{n}>", n = i + 1));
        }
    }
    format!(
        r#"
<Rational_Function_Model>
    <Inverse_Model>{inverse}</Inverse_Model>
    <RFM_Validity>
        <LONG_SCALE>0.09</LONG_SCALE>
        <LAT_SCALE>0.08</LAT_SCALE>
        <HEIGHT_SCALE>500</HEIGHT_SCALE>
        <LONG_OFF>2.35</LONG_OFF>
        <LAT_OFF>48.85</LAT_OFF>
        <HEIGHT_OFF>60</HEIGHT_OFF>
        <SAMP_SCALE>5000</SAMP_SCALE>
        <LINE_SCALE>3000</LINE_SCALE>
        <SAMP_OFF>5000.5</SAMP_OFF>
        <LINE_OFF>3000.5</LINE_OFF>
    </RFM_Validity>
</Rational_Function_Model>
"#
    )
}

/// A complete metadata document with every block plus an unrelated one.
pub fn full_document() -> String {
    format!(
        "<isd><TIL><NUMTILES>1</NUMTILES></TIL>{IMD_BLOCK}{GEO_BLOCK}{EPH_BLOCK}{ATT_BLOCK}{}</isd>",
        rpb_block()
    )
}

/// `xml` with the first `<tag>...</tag>` element cut out.
pub fn without(xml: &str, tag: &str) -> String {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open).expect("opening tag present");
    let end = xml[start..].find(&close).expect("closing tag present") + start + close.len();
    format!("{}{}", &xml[..start], &xml[end..])
}

/// Parse `xml` and return its root element.
pub fn element(xml: &str) -> Element {
    parse_document(xml).expect("parse fixture").into_root()
}
