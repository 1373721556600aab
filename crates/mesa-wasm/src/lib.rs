//! WebAssembly bindings for the MESA reader
//!
//! This crate parses MESA history and profile files already loaded into
//! memory, for browser and Node.js visualizers.
//!
//! # Usage
//!
//! ```javascript
//! import init, { parseHistory, getColumn } from '@mesa-tools/mesa-reader';
//!
//! await init();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const history = parseHistory(bytes);
//! const logL = getColumn(history, 'log_L');
//! ```

use js_sys::{Array, Float64Array, Object, Reflect};
use mesa_core::{MatchPolicy, MesaData, ProfileIndex, RecordAdapter, RowOrder, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use wasm_bindgen::prelude::*;

// ============================================================================
// Conversion
// ============================================================================

/// Header fields serialized as an ordered JS object
struct HeaderView<'a>(&'a [(String, Value)]);

impl Serialize for HeaderView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(JsValue::from)
}

fn js_error(err: mesa_core::MesaError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Builds `{ header, columnNames, rowCount, columns }`
struct JsAdapter;

impl JsAdapter {
    fn build(&self, data: &MesaData) -> Result<JsValue, JsValue> {
        let result = Object::new();

        Reflect::set(&result, &"header".into(), &to_js(&HeaderView(data.header()))?)?;
        Reflect::set(&result, &"rowCount".into(), &(data.len() as u32).into())?;

        let names = Array::new();
        let columns = Object::new();
        for column in data.columns() {
            names.push(&column.name.as_str().into());

            // Numeric columns as typed arrays, anything else as plain arrays
            let values = match column.to_f64() {
                Some(floats) => Float64Array::from(floats.as_slice()).into(),
                None => to_js(&column.values)?,
            };
            Reflect::set(&columns, &column.name.as_str().into(), &values)?;
        }
        Reflect::set(&result, &"columnNames".into(), &names)?;
        Reflect::set(&result, &"columns".into(), &columns)?;

        Ok(result.into())
    }
}

impl RecordAdapter for JsAdapter {
    type Output = Result<JsValue, JsValue>;

    fn adapt(&mut self, data: MesaData) -> mesa_core::Result<Self::Output> {
        Ok(self.build(&data))
    }
}

fn parse(data: &[u8], order: RowOrder) -> Result<JsValue, JsValue> {
    let record = mesa_core::parse_bytes(data, order).map_err(js_error)?;
    JsAdapter.adapt(record).map_err(js_error)?
}

/// Resolve the profile file name for a model number from index text
pub fn locate_profile_name(
    index_text: &str,
    model_number: i64,
    nearest: bool,
) -> mesa_core::Result<String> {
    let index = ProfileIndex::parse_str(index_text, "")?;
    let entry = index.locate(model_number, MatchPolicy::from_nearest(nearest))?;
    Ok(entry.profile_file_name())
}

// ============================================================================
// Exported Functions
// ============================================================================

/// Parse a MESA file from a Uint8Array
///
/// # Arguments
/// * `data` - File contents
/// * `reversed` - Reverse body rows (profile files)
#[wasm_bindgen(js_name = parseMesa)]
pub fn parse_mesa(data: &[u8], reversed: bool) -> Result<JsValue, JsValue> {
    parse(data, RowOrder::from_reversed(reversed))
}

/// Parse a history file; rows stay in file order
#[wasm_bindgen(js_name = parseHistory)]
pub fn parse_history(data: &[u8]) -> Result<JsValue, JsValue> {
    parse(data, RowOrder::AsStored)
}

/// Parse a profile file; zones are ordered center-first
#[wasm_bindgen(js_name = parseProfile)]
pub fn parse_profile(data: &[u8]) -> Result<JsValue, JsValue> {
    parse(data, RowOrder::Reversed)
}

/// Get one column from a parsed result
#[wasm_bindgen(js_name = getColumn)]
pub fn get_column(result: &JsValue, name: &str) -> Result<JsValue, JsValue> {
    let columns = Reflect::get(result, &"columns".into())?;
    let column = Reflect::get(&columns, &name.into())?;

    if column.is_undefined() {
        return Err(JsValue::from_str(&format!("Column '{}' not found", name)));
    }
    Ok(column)
}

/// Find the profile file name (e.g. `profile12.data`) for a model number
#[wasm_bindgen(js_name = locateProfile)]
pub fn locate_profile(index_text: &str, model_number: i32, nearest: bool) -> Result<String, JsValue> {
    locate_profile_name(index_text, model_number.into(), nearest).map_err(js_error)
}
