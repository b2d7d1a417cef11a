#![no_main]

use libfuzzer_sys::fuzz_target;
use dotgraph::metadata::moduleview::ModuleView;

fuzz_target!(|data: &[u8]| {
    let _ = ModuleView::from_mem(data.to_vec());
});
