//! Turning a stored site version into the single file that gets served.

/// Mobile navigation toggle. Added at publish time, after validation, so
/// stored HTML never carries script.
pub const NAV_TOGGLE_JS: &str = r#"<script>
(function(){
  var btn=document.getElementById("menu-btn");
  var nav=document.getElementById("nav-links");
  if(!btn||!nav)return;
  btn.addEventListener("click",function(){
    if(nav.classList.contains("open")){
      nav.classList.remove("open");
      setTimeout(function(){if(!nav.classList.contains("open"))nav.style.display="none";},350);
    }else{
      nav.style.display="flex";
      requestAnimationFrame(function(){requestAnimationFrame(function(){nav.classList.add("open");});});
    }
  });
  function sync(){
    if(getComputedStyle(btn).display==="none"){
      nav.style.display="";nav.classList.remove("open");
    }else if(!nav.classList.contains("open")){
      nav.style.display="none";
    }
  }
  window.addEventListener("resize",sync);
  sync();
})();
</script>"#;

/// Byte offset of the first case-insensitive match of an ASCII `needle`.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(needle)
}

/// Insert the navigation script before the first `</body>`. Pages without
/// a body close are returned unchanged.
pub fn inject_nav_js(html: &str) -> String {
    match find_ascii_ci(html, "</body>") {
        Some(at) => format!("{}{NAV_TOGGLE_JS}{}", &html[..at], &html[at..]),
        None => html.to_string(),
    }
}

/// Inline `css` in a `<style>` block before `</head>` and add the navigation
/// script. Fragments without a `<head>` are wrapped in a minimal document.
pub fn render_final_page(html: &str, css: &str) -> String {
    let style_block = format!("<style>\n{css}\n</style>");

    let page = match find_ascii_ci(html, "</head>") {
        Some(at) => format!("{}{style_block}\n{}", &html[..at], &html[at..]),
        None => format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n{style_block}\n</head>\n<body>\n{html}\n</body>\n</html>"
        ),
    };

    inject_nav_js(&page)
}
