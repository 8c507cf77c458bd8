pub mod test_helpers {
    use std::collections::BTreeMap;

    use crate::controller::ViewController;
    use crate::event_source::{Event, KeyCode, SimulatedEventSource};
    use crate::main_app::App;
    use crate::page_probe::PageCountProbe;
    use crate::store::{MemoryKeyValueStore, SlotStore};

    /// Builder for simulated user input
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl Default for TestScenarioBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events.push(SimulatedEventSource::key(code));
            self
        }

        pub fn press_enter(self) -> Self {
            self.press_key(KeyCode::Enter)
        }

        pub fn press_esc(self) -> Self {
            self.press_key(KeyCode::Esc)
        }

        /// Type each character of `text`
        pub fn type_text(mut self, text: &str) -> Self {
            self.events
                .extend(text.chars().map(SimulatedEventSource::char_key));
            self
        }

        /// Open slot `index` (0-based) from the grid with its number key
        pub fn open_slot(self, index: usize) -> Self {
            let key = char::from_digit(index as u32 + 1, 10).unwrap_or('1');
            self.press_char(key)
        }

        pub fn quit(mut self) -> Self {
            self.events.push(SimulatedEventSource::ctrl_char_key('q'));
            self
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// App over an in-memory store. The returned store handle shares the
    /// app's entries.
    pub fn app_with_memory_store(
        probe: Box<dyn PageCountProbe>,
        page_height: u32,
    ) -> (App, MemoryKeyValueStore) {
        let kv = MemoryKeyValueStore::new();
        let controller = ViewController::new(Box::new(SlotStore::new(kv.clone())), page_height);
        (App::new(controller, probe, page_height.max(1)), kv)
    }

    /// Writes PDF files object by object, tracking byte offsets for the
    /// cross-reference sections.
    pub struct PdfBuilder {
        bytes: Vec<u8>,
        offsets: BTreeMap<u32, usize>,
        unindexed: Vec<u32>,
        last_xref: Option<usize>,
    }

    impl Default for PdfBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl PdfBuilder {
        pub fn new() -> Self {
            Self {
                bytes: b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n".to_vec(),
                offsets: BTreeMap::new(),
                unindexed: Vec::new(),
                last_xref: None,
            }
        }

        /// Current end of the file
        pub fn len(&self) -> usize {
            self.bytes.len()
        }

        pub fn is_empty(&self) -> bool {
            self.bytes.is_empty()
        }

        pub fn offset_of(&self, id: u32) -> Option<usize> {
            self.offsets.get(&id).copied()
        }

        pub fn object(&mut self, id: u32, body: &str) -> &mut Self {
            self.begin_object(id);
            self.bytes
                .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
            self
        }

        /// `dict` must not carry `/Length`; it is added here
        pub fn stream_object(&mut self, id: u32, dict: &str, data: &[u8]) -> &mut Self {
            self.begin_object(id);
            let dict = dict.trim_end_matches(">>");
            self.bytes.extend_from_slice(
                format!("{id} 0 obj\n{dict} /Length {} >>\nstream\n", data.len()).as_bytes(),
            );
            self.bytes.extend_from_slice(data);
            self.bytes.extend_from_slice(b"\nendstream\nendobj\n");
            self
        }

        pub fn raw(&mut self, text: &str) -> &mut Self {
            self.bytes.extend_from_slice(text.as_bytes());
            self
        }

        /// Classic xref section for the objects written since the previous
        /// one, then the trailer. Later revisions point back with `/Prev`.
        pub fn finish_revision(&mut self, root: u32) -> &mut Self {
            let xref = self.bytes.len();
            let size = self.offsets.keys().max().map_or(1, |max| max + 1);
            let mut section = String::from("xref\n");
            if self.last_xref.is_none() {
                section.push_str("0 1\n0000000000 65535 f \n");
            }
            let mut ids = std::mem::take(&mut self.unindexed);
            ids.sort_unstable();
            ids.dedup();
            for id in ids {
                let offset = self.offsets[&id];
                section.push_str(&format!("{id} 1\n{offset:010} 00000 n \n"));
            }
            let prev = self
                .last_xref
                .map(|p| format!(" /Prev {p}"))
                .unwrap_or_default();
            section.push_str(&format!(
                "trailer\n<< /Size {size} /Root {root} 0 R{prev} >>\nstartxref\n{xref}\n%%EOF\n"
            ));
            self.bytes.extend_from_slice(section.as_bytes());
            self.last_xref = Some(xref);
            self
        }

        pub fn build(&self) -> Vec<u8> {
            self.bytes.clone()
        }

        fn begin_object(&mut self, id: u32) {
            self.offsets.insert(id, self.bytes.len());
            self.unindexed.push(id);
        }
    }

    /// `/Type /Pages` node listing page objects `first..first + count`
    pub fn page_tree(first: u32, count: usize) -> String {
        let kids: Vec<String> = (0..count as u32)
            .map(|i| format!("{} 0 R", first + i))
            .collect();
        format!(
            "<< /Type /Pages /Kids [{}] /Count {count} >>",
            kids.join(" ")
        )
    }

    pub fn page_object(parent: u32) -> String {
        format!("<< /Type /Page /Parent {parent} 0 R /MediaBox [0 0 612 792] >>")
    }

    /// Single-revision document with `pages` blank pages. Catalog is object
    /// 1, the page tree object 2, pages start at object 3.
    pub fn pdf_builder_with_pages(pages: usize) -> PdfBuilder {
        let mut pdf = PdfBuilder::new();
        pdf.object(1, "<< /Type /Catalog /Pages 2 0 R >>")
            .object(2, &page_tree(3, pages));
        for i in 0..pages as u32 {
            pdf.object(3 + i, &page_object(2));
        }
        pdf.finish_revision(1);
        pdf
    }

    pub fn pdf_with_pages(pages: usize) -> Vec<u8> {
        pdf_builder_with_pages(pages).build()
    }
}
