use pinyinkit::loader::{load_chars_csv, load_words};
use pinyinkit::syllables::extend_with_standard;
use pinyinkit::{Dictionary, DictionarySource, PinyinServer, ServerConfig};

pub const CHARS_CSV: &str = "\
25105,500,wo3
20204,400,men
23567,146,xiao3
26379,10,peng2
34028,200,peng2
21451,40,you3
26159,400,shi4
20320,300,ni3
22909,250,hao3
21644,300,he2/huo4
";

pub const WORDS: &str = "\
# word\tpinyin\tscore
朋友\tpeng2 you3\t6
小朋友\txiao3 peng2 you3
你好\tni3 hao3\t9
我们\two3 men\t9
";

#[allow(dead_code)]
pub fn source() -> DictionarySource {
    let mut source = load_chars_csv(CHARS_CSV.as_bytes()).unwrap();
    source.words = load_words(WORDS.as_bytes()).unwrap();
    extend_with_standard(&mut source);
    source
}

#[allow(dead_code)]
pub fn server() -> PinyinServer {
    let config = ServerConfig::default();
    let dictionary = Dictionary::from_source(&source(), config.base());
    PinyinServer::new(dictionary, config)
}
