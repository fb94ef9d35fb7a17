//! Streaming record scanner
//!
//! Walks the knob file (a JSON array of objects) one element at a time.
//! Each element is cut out of the byte stream into a single fixed-size
//! buffer and decoded from there, so memory use does not depend on the
//! length of the file.
//!
//! A `Last` request is resolved in the same single pass: every element
//! matches it and overwrites the previous copy, so the element held when
//! the array ends is the real last one. No second pass to count elements.

use heapless::Vec;
use knobstore_hal::{ByteStream, File, FileSystem, OpenMode};

use crate::codec;
use crate::config::{RECORD_BUFFER_SIZE, STREAM_CHUNK_SIZE};
use crate::error::StoreError;
use crate::navigate::RecordSource;
use crate::record::{ConfigIndex, Located};

type Element = Vec<u8, RECORD_BUFFER_SIZE>;

/// Copy one JSON object from the stream into `element`
///
/// The stream must be positioned on the opening `{`. Braces inside strings
/// are not counted. Fails with [`StoreError::ParseError`] if the object is
/// cut short by the end of the file or does not fit the buffer.
fn capture_object<F: File, const N: usize>(
    stream: &mut ByteStream<F, N>,
    element: &mut Element,
) -> Result<(), StoreError> {
    element.clear();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    loop {
        let Some(byte) = stream.next_byte()? else {
            return Err(StoreError::ParseError);
        };
        element.push(byte).map_err(|_| StoreError::ParseError)?;

        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
}

/// Scan an open knob file for the element matching `request`
///
/// Stops at the first exact match. A decode error ends the scan; the result
/// is then whatever matched before it, if anything.
pub fn scan<F: File>(file: F, request: ConfigIndex) -> Result<Located, StoreError> {
    let mut stream: ByteStream<F, STREAM_CHUNK_SIZE> = ByteStream::new(file);

    if !stream.find(b'[')? {
        warn!("Knob file holds no array");
        return Err(StoreError::ParseError);
    }

    let mut element = Element::new();
    let mut found: Option<Located> = None;
    let mut failure = StoreError::NotFound;
    let mut position = 0usize;

    loop {
        match stream.skip_whitespace()? {
            Some(b'{') => {}
            Some(b']') => break,
            _ => {
                warn!("Knob element {} is not an object", position);
                failure = StoreError::ParseError;
                break;
            }
        }

        if let Err(e) = capture_object(&mut stream, &mut element) {
            warn!("Knob element {} truncated or too large", position);
            failure = e;
            break;
        }

        let config = match codec::decode_knob(&element) {
            Ok(config) => config,
            Err(e) => {
                warn!("Knob element {} malformed", position);
                failure = e;
                break;
            }
        };

        if request.matches(position) {
            found = Some(Located {
                index: position,
                config,
            });
            if request.is_exactly(position) {
                break;
            }
        }

        if !stream.find_until(b',', b']')? {
            break;
        }
        position += 1;
    }

    match found {
        Some(located) => {
            trace!("Resolved {:?} to index {}", request, located.index);
            Ok(located)
        }
        None => Err(failure),
    }
}

/// Open the knob file at `path` and scan it
pub fn scan_path<S: FileSystem>(
    storage: &mut S,
    path: &str,
    request: ConfigIndex,
) -> Result<Located, StoreError> {
    let file = storage.open(path, OpenMode::Read).map_err(|e| {
        warn!("Cannot open {}: {:?}", path, e);
        StoreError::from(e)
    })?;
    scan(file, request)
}

/// Knob file on a file system, read fresh on every lookup
pub struct KnobFile<'a, S: FileSystem> {
    storage: &'a mut S,
    path: &'a str,
}

impl<'a, S: FileSystem> KnobFile<'a, S> {
    pub fn new(storage: &'a mut S, path: &'a str) -> Self {
        Self { storage, path }
    }
}

impl<S: FileSystem> RecordSource for KnobFile<'_, S> {
    fn locate(&mut self, request: ConfigIndex) -> Result<Located, StoreError> {
        scan_path(&mut *self.storage, self.path, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knobstore_hal::RamFileSystem;

    const PATH: &str = "/Knob.jsn";

    type Fs = RamFileSystem<2, 2048>;

    fn storage(json: &str) -> Fs {
        let mut fs = Fs::new();
        fs.store(PATH, json.as_bytes()).unwrap();
        fs
    }

    fn get(fs: &mut Fs, request: ConfigIndex) -> Result<Located, StoreError> {
        scan_path(fs, PATH, request)
    }

    const THREE: &str = r#"[
        {"descriptor":"Fine","num_positions":0,"position":0,"position_width_radians":0.05,
         "detent_strength_unit":0.0,"endstop_strength_unit":1.0,"snap_point":1.1},
        {"descriptor":"Coarse","num_positions":10,"position":0,"position_width_radians":0.2,
         "detent_strength_unit":1.5,"endstop_strength_unit":1.0,"snap_point":0.55},
        {"descriptor":"Switch","num_positions":2,"position":0,"position_width_radians":0.6,
         "detent_strength_unit":1.0,"endstop_strength_unit":1.0,"snap_point":0.55}
    ]"#;

    #[test]
    fn test_exact_index() {
        let mut fs = storage(THREE);
        for (i, name) in ["Fine", "Coarse", "Switch"].iter().enumerate() {
            let located = get(&mut fs, ConfigIndex::Concrete(i)).unwrap();
            assert_eq!(located.index, i);
            assert_eq!(located.config.descriptor, *name);
        }
    }

    #[test]
    fn test_last_resolves_to_final_element() {
        let mut fs = storage(THREE);
        let located = get(&mut fs, ConfigIndex::Last).unwrap();
        assert_eq!(located.index, 2);
        assert_eq!(located.config.descriptor, "Switch");
        assert_eq!(located, get(&mut fs, ConfigIndex::Concrete(2)).unwrap());
    }

    #[test]
    fn test_past_end() {
        let mut fs = storage(THREE);
        assert_eq!(
            get(&mut fs, ConfigIndex::Concrete(3)),
            Err(StoreError::NotFound)
        );
        assert_eq!(
            get(&mut fs, ConfigIndex::Concrete(usize::MAX)),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn test_empty_array() {
        let mut fs = storage("  [ ]  ");
        assert_eq!(get(&mut fs, ConfigIndex::Last), Err(StoreError::NotFound));
        assert_eq!(
            get(&mut fs, ConfigIndex::Concrete(0)),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn test_missing_file() {
        let mut fs = Fs::new();
        assert_eq!(
            get(&mut fs, ConfigIndex::Concrete(0)),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn test_not_an_array() {
        let mut fs = storage(r#"{"descriptor":"A"}"#);
        assert_eq!(
            get(&mut fs, ConfigIndex::Concrete(0)),
            Err(StoreError::ParseError)
        );
        let mut fs = storage("");
        assert_eq!(get(&mut fs, ConfigIndex::Last), Err(StoreError::ParseError));
    }

    #[test]
    fn test_first_element_malformed() {
        let mut fs = storage(r#"[{"position":},{"position":1}]"#);
        assert_eq!(
            get(&mut fs, ConfigIndex::Concrete(0)),
            Err(StoreError::ParseError)
        );
        assert_eq!(
            get(&mut fs, ConfigIndex::Concrete(1)),
            Err(StoreError::ParseError)
        );
        assert_eq!(get(&mut fs, ConfigIndex::Last), Err(StoreError::ParseError));
    }

    #[test]
    fn test_decode_error_keeps_earlier_match() {
        let mut fs = storage(r#"[{"position":1},{"position":2},{"position":2 3}]"#);
        let located = get(&mut fs, ConfigIndex::Last).unwrap();
        assert_eq!(located.index, 1);
        assert_eq!(located.config.position, 2);
        assert_eq!(get(&mut fs, ConfigIndex::Concrete(0)).unwrap().index, 0);
    }

    #[test]
    fn test_loose_field_types_do_not_stop_scan() {
        let mut fs = storage(
            r#"[{"position":null,"num_positions":"4"},{"position":2.0},{"descriptor":"C"}]"#,
        );
        let first = get(&mut fs, ConfigIndex::Concrete(0)).unwrap();
        assert_eq!(first.config.position, 0);
        assert_eq!(first.config.num_positions, 0);
        assert_eq!(get(&mut fs, ConfigIndex::Concrete(1)).unwrap().config.position, 2);
        let last = get(&mut fs, ConfigIndex::Last).unwrap();
        assert_eq!(last.index, 2);
        assert_eq!(last.config.descriptor, "C");
    }

    #[test]
    fn test_nested_array_element() {
        // An array where an object is expected is malformed, even if it would
        // fill the record field by field
        let mut fs = storage(r#"[{"position":1},["B",4,0,0.1,1,1,0.5]]"#);
        assert_eq!(
            get(&mut fs, ConfigIndex::Concrete(1)),
            Err(StoreError::ParseError)
        );
        assert_eq!(get(&mut fs, ConfigIndex::Last).unwrap().index, 0);
    }

    #[test]
    fn test_truncated_file() {
        let mut fs = storage(r#"[{"descriptor":"A","num_posi"#);
        assert_eq!(
            get(&mut fs, ConfigIndex::Concrete(0)),
            Err(StoreError::ParseError)
        );
        assert_eq!(get(&mut fs, ConfigIndex::Last), Err(StoreError::ParseError));

        // Missing closing bracket after a complete element still resolves
        let mut fs = storage(r#"[{"descriptor":"A"}"#);
        assert_eq!(get(&mut fs, ConfigIndex::Last).unwrap().index, 0);
    }

    #[test]
    fn test_oversized_element() {
        let big = "x".repeat(RECORD_BUFFER_SIZE);
        let json = std::format!(r#"[{{"position":1}},{{"descriptor":"{}"}}]"#, big);
        let mut fs = storage(&json);
        assert_eq!(get(&mut fs, ConfigIndex::Concrete(0)).unwrap().config.position, 1);
        assert_eq!(
            get(&mut fs, ConfigIndex::Concrete(1)),
            Err(StoreError::ParseError)
        );
        assert_eq!(get(&mut fs, ConfigIndex::Last).unwrap().index, 0);
    }

    #[test]
    fn test_delimiters_inside_strings() {
        let mut fs = storage(r#"[{"descriptor":"a}, {b]\"c"},{"descriptor":"[second]"}]"#);
        let first = get(&mut fs, ConfigIndex::Concrete(0)).unwrap();
        assert_eq!(first.config.descriptor, "a}, {b]\"c");
        let last = get(&mut fs, ConfigIndex::Last).unwrap();
        assert_eq!(last.index, 1);
        assert_eq!(last.config.descriptor, "[second]");
    }

    #[test]
    fn test_nested_unknown_keys() {
        let mut fs = storage(r#"[{"extra":{"a":[1,{"b":2}]},"position":5},{"position":6}]"#);
        assert_eq!(get(&mut fs, ConfigIndex::Concrete(0)).unwrap().config.position, 5);
        assert_eq!(get(&mut fs, ConfigIndex::Concrete(1)).unwrap().config.position, 6);
    }

    #[test]
    fn test_long_descriptor_truncated() {
        let name = "n".repeat(80);
        let json = std::format!(r#"[{{"descriptor":"{}"}}]"#, name);
        let mut fs = storage(&json);
        let located = get(&mut fs, ConfigIndex::Concrete(0)).unwrap();
        assert_eq!(located.config.descriptor.as_str(), &name[..49]);
    }

    #[test]
    fn test_knob_file_source() {
        let mut fs = storage(THREE);
        let mut source = KnobFile::new(&mut fs, PATH);
        assert_eq!(source.locate(ConfigIndex::Last).unwrap().index, 2);
    }
}
