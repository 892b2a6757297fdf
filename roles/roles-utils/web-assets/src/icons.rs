/// Bin icon used as favicon and page logo.
pub fn bin_favicon_inline_svg() -> &'static str {
    r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><rect x="14" y="20" width="36" height="38" rx="4" fill="#2E8B57"/><rect x="10" y="12" width="44" height="8" rx="3" fill="#ADFF2F"/><rect x="26" y="6" width="12" height="6" rx="2" fill="#ADFF2F"/><path d="M24 28v22M32 28v22M40 28v22" stroke="#0f0f0f" stroke-width="3" stroke-linecap="round"/></svg>"##
}

/// Shared palette and logo class for gateway pages.
pub fn brand_css() -> &'static str {
    r#"
        :root {
            --accent: #ADFF2F;
            --confirm: #2E8B57;
            --panel: #1a1a1a;
            --border: #2a2a2a;
            --muted: #9ca3af;
        }
        .brand-icon::before {
            content: "";
            display: inline-block;
            width: 1em;
            height: 1em;
            margin-right: 0.4em;
            vertical-align: -0.1em;
            background: url("/favicon.svg") no-repeat center / contain;
        }
    "#
}
