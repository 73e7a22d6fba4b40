//! Minimal PPTX (OOXML presentation) writer.
//!
//! Emits just enough of the package for PowerPoint and LibreOffice to open
//! it: content types, package rels, the presentation part, one slide
//! master/layout/theme trio, and one slide part per record. Slide text
//! goes into a title shape and a fixed-geometry body text box; an
//! illustration, when present, is embedded under `ppt/media/` and placed
//! at a fixed position on the right.
//!
//! One slide's unreadable image is logged and skipped; only failures of
//! the archive itself are fatal.

use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::outline::SlideSpec;
use crate::{Error, Result};

/// English Metric Units per inch.
const EMU_PER_INCH: i64 = 914_400;

/// Body text box geometry: 0.5in from the left, 1.5in down, 6in x 3in.
const BODY_X: i64 = EMU_PER_INCH / 2;
const BODY_Y: i64 = EMU_PER_INCH * 3 / 2;
const BODY_W: i64 = EMU_PER_INCH * 6;
const BODY_H: i64 = EMU_PER_INCH * 3;

/// Illustration geometry: right side, 4in square.
const IMAGE_X: i64 = EMU_PER_INCH * 5;
const IMAGE_Y: i64 = EMU_PER_INCH * 3 / 2;
const IMAGE_W: i64 = EMU_PER_INCH * 4;
const IMAGE_H: i64 = EMU_PER_INCH * 4;

/// Assemble the slide records into a `.pptx` under `output_dir` and
/// return its path.
pub fn write_deck(slides: &[SlideSpec], output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(format!(
        "presentation_{}.pptx",
        uuid::Uuid::new_v4().simple()
    ));

    let file = File::create(&path)
        .map_err(|e| Error::Assembly(format!("cannot create {}: {e}", path.display())))?;
    let mut zip = ZipWriter::new(file);

    // Read images up front; a missing or unreadable file degrades that
    // slide to text-only instead of failing the document.
    let images: Vec<Option<Vec<u8>>> = slides
        .iter()
        .map(|s| {
            let img_path = s.image_path.as_ref()?;
            match std::fs::read(img_path) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!(
                        path = %img_path.display(),
                        error = %e,
                        "could not read slide illustration, omitting it"
                    );
                    None
                }
            }
        })
        .collect();

    write_part(&mut zip, "[Content_Types].xml", &content_types(slides.len()))?;
    write_part(&mut zip, "_rels/.rels", PACKAGE_RELS)?;
    write_part(&mut zip, "ppt/presentation.xml", &presentation(slides.len()))?;
    write_part(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels(slides.len()),
    )?;
    write_part(&mut zip, "ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER)?;
    write_part(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        MASTER_RELS,
    )?;
    write_part(&mut zip, "ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT)?;
    write_part(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        LAYOUT_RELS,
    )?;
    write_part(&mut zip, "ppt/theme/theme1.xml", THEME)?;

    for (idx, (slide, image)) in slides.iter().zip(&images).enumerate() {
        let n = idx + 1;
        let has_image = image.is_some();

        write_part(&mut zip, &format!("ppt/slides/slide{n}.xml"), &slide_xml(slide, idx, has_image))?;
        write_part(
            &mut zip,
            &format!("ppt/slides/_rels/slide{n}.xml.rels"),
            &slide_rels(n, has_image),
        )?;
        if let Some(bytes) = image {
            write_binary_part(&mut zip, &format!("ppt/media/image{n}.png"), bytes)?;
        }
    }

    zip.finish()
        .map_err(|e| Error::Assembly(format!("cannot finalize {}: {e}", path.display())))?;

    tracing::info!(path = %path.display(), slides = slides.len(), "deck assembled");
    Ok(path)
}

fn write_part(zip: &mut ZipWriter<File>, name: &str, xml: &str) -> Result<()> {
    write_binary_part(zip, name, xml.as_bytes())
}

fn write_binary_part(zip: &mut ZipWriter<File>, name: &str, bytes: &[u8]) -> Result<()> {
    zip.start_file(name, FileOptions::default())
        .map_err(|e| Error::Assembly(format!("cannot start part {name}: {e}")))?;
    zip.write_all(bytes)
        .map_err(|e| Error::Assembly(format!("cannot write part {name}: {e}")))?;
    Ok(())
}

fn xml_text(s: &str) -> Cow<'_, str> {
    escape(s)
}

fn content_types(slide_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
"#,
    );
    for n in 1..=slide_count {
        xml.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{n}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>\n"
        ));
    }
    xml.push_str("</Types>");
    xml
}

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

fn presentation(slide_count: usize) -> String {
    let mut sld_ids = String::new();
    for n in 1..=slide_count {
        // rId1 is the master; slides start at rId2.
        sld_ids.push_str(&format!(
            "<p:sldId id=\"{}\" r:id=\"rId{}\"/>",
            255 + n,
            n + 1
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
<p:sldIdLst>{sld_ids}</p:sldIdLst>
<p:sldSz cx="9144000" cy="6858000"/>
<p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
"#,
    );
    for n in 1..=slide_count {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide{n}.xml\"/>\n",
            n + 1
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

const SLIDE_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
<p:grpSpPr/>
</p:spTree></p:cSld>
<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>
</p:sldMaster>"#;

const MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>
</Relationships>"#;

const SLIDE_LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="titleOnly">
<p:cSld><p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
<p:grpSpPr/>
</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#;

const LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>"#;

// The smallest theme the format validators accept: a full color scheme, a
// font scheme, and a three-entry format scheme.
const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="deckgen">
<a:themeElements>
<a:clrScheme name="deckgen">
<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
<a:dk2><a:srgbClr val="44546A"/></a:dk2>
<a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
<a:accent1><a:srgbClr val="4472C4"/></a:accent1>
<a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
<a:accent4><a:srgbClr val="FFC000"/></a:accent4>
<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
<a:accent6><a:srgbClr val="70AD47"/></a:accent6>
<a:hlink><a:srgbClr val="0563C1"/></a:hlink>
<a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
</a:clrScheme>
<a:fontScheme name="deckgen">
<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>
<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>
</a:fontScheme>
<a:fmtScheme name="deckgen">
<a:fillStyleLst>
<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
</a:fillStyleLst>
<a:lnStyleLst>
<a:ln><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
<a:ln><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
<a:ln><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
</a:lnStyleLst>
<a:effectStyleLst>
<a:effectStyle><a:effectLst/></a:effectStyle>
<a:effectStyle><a:effectLst/></a:effectStyle>
<a:effectStyle><a:effectLst/></a:effectStyle>
</a:effectStyleLst>
<a:bgFillStyleLst>
<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
</a:bgFillStyleLst>
</a:fmtScheme>
</a:themeElements>
</a:theme>"#;

fn slide_xml(slide: &SlideSpec, idx: usize, has_image: bool) -> String {
    let title = slide.title_or_placeholder(idx);

    let mut bullet_paragraphs = String::new();
    for bullet in &slide.bullets {
        bullet_paragraphs.push_str(&format!(
            "<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>",
            xml_text(bullet)
        ));
    }
    if slide.bullets.is_empty() {
        bullet_paragraphs.push_str("<a:p><a:endParaRPr lang=\"en-US\"/></a:p>");
    }

    let picture = if has_image {
        format!(
            r#"<p:pic>
<p:nvPicPr><p:cNvPr id="4" name="Illustration {n}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>
<p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>
<p:spPr><a:xfrm><a:off x="{IMAGE_X}" y="{IMAGE_Y}"/><a:ext cx="{IMAGE_W}" cy="{IMAGE_H}"/></a:xfrm>
<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>
</p:pic>"#,
            n = idx + 1
        )
    } else {
        String::new()
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
<p:grpSpPr/>
<p:sp>
<p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
<p:spPr/>
<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{title}</a:t></a:r></a:p></p:txBody>
</p:sp>
<p:sp>
<p:nvSpPr><p:cNvPr id="3" name="Body"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
<p:spPr><a:xfrm><a:off x="{BODY_X}" y="{BODY_Y}"/><a:ext cx="{BODY_W}" cy="{BODY_H}"/></a:xfrm>
<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>
<p:txBody><a:bodyPr wrap="square"/><a:lstStyle/>{bullets}</p:txBody>
</p:sp>
{picture}
</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#,
        title = xml_text(&title),
        bullets = bullet_paragraphs,
        picture = picture,
    )
}

fn slide_rels(n: usize, has_image: bool) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
"#,
    );
    if has_image {
        xml.push_str(&format!(
            "<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"../media/image{n}.png\"/>\n"
        ));
    }
    xml.push_str("</Relationships>");
    xml
}
