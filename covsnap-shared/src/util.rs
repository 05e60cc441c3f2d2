pub struct BytesFmt(pub u64);

impl core::fmt::Display for BytesFmt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
        let prc = f.precision().unwrap_or(2);
        if self.0 < 1 << 10 {
            return write!(f, "{} B", self.0);
        }
        let mut shift = 10;
        for unit in UNITS {
            if self.0 < 1 << (shift + 10) || unit == "TiB" {
                return write!(
                    f,
                    "{:.2$} {}",
                    self.0 as f64 / (1u64 << shift) as f64,
                    unit,
                    prc
                );
            }
            shift += 10;
        }
        unreachable!()
    }
}
