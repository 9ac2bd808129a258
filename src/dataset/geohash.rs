//! Geohash encoding (base32, interleaved longitude/latitude bits)

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Longest precision whose bits still fit comfortably in f64 resolution
pub const MAX_PRECISION: usize = 12;

/// Encode `(lat, lng)` to a geohash of `precision` characters.
/// Precision is clamped to `1..=MAX_PRECISION`.
pub fn encode(lat: f64, lng: f64, precision: usize) -> String {
    let precision = precision.clamp(1, MAX_PRECISION);
    let mut lat_range = (-90.0f64, 90.0f64);
    let mut lng_range = (-180.0f64, 180.0f64);

    let mut hash = String::with_capacity(precision);
    let mut even_bit = true;
    let mut bits = 0u8;
    let mut ch = 0usize;

    while hash.len() < precision {
        let (range, value) = if even_bit {
            (&mut lng_range, lng)
        } else {
            (&mut lat_range, lat)
        };
        let mid = (range.0 + range.1) / 2.0;
        if value >= mid {
            ch = (ch << 1) | 1;
            range.0 = mid;
        } else {
            ch <<= 1;
            range.1 = mid;
        }
        even_bit = !even_bit;

        bits += 1;
        if bits == 5 {
            hash.push(BASE32[ch] as char);
            bits = 0;
            ch = 0;
        }
    }

    hash
}
