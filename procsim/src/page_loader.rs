/// Para onde vão as páginas que saem da memória e de onde vêm as que entram.
///
/// O `Mmu` chama `flush_page` quando despeja a página de um frame e
/// `load_page_into` quando traz uma página para um frame depois de um page
/// fault.
pub trait PageLoader {
    fn load_page_into(&mut self, owner: &str, frame_index: usize);

    fn flush_page(&mut self, owner: &str, frame_index: usize);
}
