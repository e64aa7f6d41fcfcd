// src/config/consts.rs

// Net config
pub const CATALOG_HOST: &str = "www.bricklink.com";
pub const CATALOG_PATH_TMPL: &str = "/v2/catalog/catalogitem.page?S={code}";
pub const IMAGE_URL_TMPL: &str = "https://img.bricklink.com/ItemImage/SN/0/{code}-1.png";
pub const USER_AGENT: &str = "brick_enrich/0.1";
pub const MAX_REDIRECTS: usize = 6;

// Local files
pub const LOG_FILE: &str = ".store/debug.log";
pub const DEFAULT_OUT_FILE: &str = "enriched.html";

// Matcher: set-code prefix letters, digit run bounds
pub const CODE_PREFIXES: [char; 2] = ['M', 'N'];
pub const CODE_MIN_DIGITS: usize = 4;
pub const CODE_MAX_DIGITS: usize = 5;

// Scanner: subtrees whose text is never page copy
pub const SKIP_TAGS: [&str; 3] = ["script", "style", "noscript"];

// Enrichment markers and shop page hooks
pub const ENRICHED_CLASS: &str = "bricklink-enriched";
pub const PRODUCT_CONTAINER_CLASSES: [&str; 3] =
    ["club-product-snippet", "product-snippet", "p-cursor-pointer"];
pub const IMAGE_WRAPPER_CLASSES: [&str; 3] =
    ["product-snippet-image-container", "product-snippet__img-wrapper", "p-relative"];
pub const LAZY_ATTRS: [&str; 5] = ["srcset", "data-srcset", "data-sizes", "sizes", "data-src"];
pub const LAZY_CLASSES: [&str; 3] = ["lazyautosizes", "ls-is-cached", "lazyloaded"];

// Inline styling carried on generated nodes
pub const WRAPPER_STYLE: &str = "display:inline-block";
pub const LINK_STYLE: &str = "margin-left:5px;color:#0066cc;text-decoration:none;\
padding:4px 8px;min-height:44px;display:inline-block;vertical-align:middle";
pub const IMG_VISIBLE_STYLE: &str = "opacity:1;visibility:visible;display:block;\
max-width:100%;height:auto";
pub const IMG_ONLOAD_JS: &str =
    "this.style.opacity='1';this.style.visibility='visible';this.style.display='block';";
pub const IMG_ONERROR_JS: &str = "this.style.display='none';";

// Concurrency
pub const REQUEST_PAUSE_MS: u64 = 75; // be polite
pub const JITTER_MS: u64 = 50; // extra 0..50 ms
