//! Best-effort AcroForm fix-up applied after rendering

use lopdf::{Document, Object};
use tracing::{debug, warn};

/// Ask viewers to rebuild field appearances on open.
///
/// Sets `/NeedAppearances true` on the document's AcroForm. Returns the
/// rewritten bytes and `true` on success; any parse or structure problem
/// leaves the input untouched and returns `false`.
pub fn force_manual_appearance_regeneration(pdf: &[u8]) -> (Vec<u8>, bool) {
    match set_need_appearances(pdf) {
        Ok(Some(updated)) => (updated, true),
        Ok(None) => {
            debug!("no AcroForm present; nothing to regenerate");
            (pdf.to_vec(), false)
        }
        Err(reason) => {
            warn!("appearance regeneration skipped: {reason}");
            (pdf.to_vec(), false)
        }
    }
}

fn set_need_appearances(pdf: &[u8]) -> Result<Option<Vec<u8>>, String> {
    let mut doc = Document::load_mem(pdf).map_err(|e| format!("Failed to parse PDF: {}", e))?;

    let catalog = doc
        .catalog_mut()
        .map_err(|e| format!("Failed to get catalog: {}", e))?;
    let acroform = match catalog.get_mut(b"AcroForm") {
        Ok(acroform) => acroform,
        Err(_) => return Ok(None),
    };

    match acroform {
        Object::Dictionary(dict) => dict.set("NeedAppearances", Object::Boolean(true)),
        Object::Reference(id) => {
            let id = *id;
            doc.get_object_mut(id)
                .map_err(|e| format!("Failed to get AcroForm: {}", e))?
                .as_dict_mut()
                .map_err(|_| "AcroForm is not a dictionary")?
                .set("NeedAppearances", Object::Boolean(true));
        }
        _ => return Err("AcroForm is not a dictionary".to_string()),
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| format!("Failed to save PDF: {}", e))?;
    Ok(Some(buffer))
}
