//! Browser tests for the navigation script: dropdown disclosure, keyboard
//! handling and viewport-aware placement.
//!
//! These tests build the sample site into `tests/browser/generated/` and
//! load the preview pages over file:// in headless Chrome.
//!
//! Run with: `cargo test --test browser_nav -- --ignored`

use headless_chrome::{Browser, LaunchOptions, Tab};
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, OnceLock};

// ===========================================================================
// Fixtures
// ===========================================================================

fn generated_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/browser/generated")
}

fn run_site_nav(args: &[&str]) {
    let status = Command::new(env!("CARGO_BIN_EXE_site-nav"))
        .args(args)
        .status()
        .expect("failed to run site-nav");
    assert!(status.success(), "site-nav {:?} failed", args);
}

/// Scaffold the sample site and build its previews once per test run.
fn ensure_fixtures_built() -> PathBuf {
    static BUILT: OnceLock<PathBuf> = OnceLock::new();
    BUILT
        .get_or_init(|| {
            let root = generated_dir();
            let site = root.join("site");
            let dist = root.join("dist");
            let _ = std::fs::remove_dir_all(&dist);
            let site_str = site.to_str().unwrap();
            run_site_nav(&["--dir", site_str, "scaffold", "--force"]);
            run_site_nav(&["--dir", site_str, "build", "--output", dist.to_str().unwrap()]);
            dist
        })
        .clone()
}

fn page_url(relative: &str) -> String {
    let path = ensure_fixtures_built().join(relative);
    assert!(path.is_file(), "missing fixture {}", path.display());
    format!("file://{}", path.display())
}

fn launch(window_size: (u32, u32)) -> Browser {
    Browser::new(LaunchOptions {
        window_size: Some(window_size),
        ..Default::default()
    })
    .expect("failed to launch headless Chrome")
}

fn browser() -> &'static Browser {
    static BROWSER: OnceLock<Browser> = OnceLock::new();
    BROWSER.get_or_init(|| launch((1280, 800)))
}

/// Phone-sized window, below the desktop breakpoint.
fn mobile_browser() -> &'static Browser {
    static BROWSER: OnceLock<Browser> = OnceLock::new();
    BROWSER.get_or_init(|| launch((390, 844)))
}

fn open_page(relative: &str) -> Arc<Tab> {
    open_page_in(browser(), relative)
}

fn open_page_in(browser: &Browser, relative: &str) -> Arc<Tab> {
    let tab = browser.new_tab().unwrap();
    tab.navigate_to(&page_url(relative))
        .unwrap()
        .wait_until_navigated()
        .unwrap();
    tab
}

fn eval_bool(tab: &Tab, js: &str) -> bool {
    tab.evaluate(js, false)
        .unwrap()
        .value
        .unwrap()
        .as_bool()
        .unwrap()
}

fn eval_string(tab: &Tab, js: &str) -> String {
    tab.evaluate(js, false)
        .unwrap()
        .value
        .unwrap()
        .as_str()
        .unwrap()
        .to_string()
}

const DROPDOWN: &str = "document.querySelector('.nav-desktop .has-dropdown')";
const TRIGGER: &str = "document.querySelector('.nav-desktop .dropdown-trigger')";

// ===========================================================================
// Progressive enhancement
// ===========================================================================

#[test]
#[ignore]
fn script_enhances_desktop_nav() {
    let tab = open_page("en/about/index.html");
    assert!(eval_bool(
        &tab,
        "document.querySelector('nav.nav-desktop').classList.contains('nav-enhanced')"
    ));
    assert!(eval_bool(&tab, "typeof window.siteNav.choosePlacement === 'function'"));
}

#[test]
#[ignore]
fn skip_link_comes_first_and_targets_main() {
    let tab = open_page("en/about/index.html");
    assert!(eval_bool(
        &tab,
        "document.querySelector('a, button, input, summary').classList.contains('skip-link')"
    ));
    assert!(eval_bool(
        &tab,
        r#"(() => {
            const href = document.querySelector('.skip-link').getAttribute('href');
            return document.getElementById(href.slice(1)).tagName === 'MAIN';
        })()"#
    ));
}

#[test]
#[ignore]
fn current_page_is_marked() {
    let tab = open_page("en/about/index.html");
    let current = eval_string(
        &tab,
        "document.querySelector('.nav-desktop [aria-current=\"page\"]').textContent.trim()",
    );
    assert_eq!(current, "About");
}

// ===========================================================================
// Disclosure
// ===========================================================================

#[test]
#[ignore]
fn dropdown_starts_closed_off_section() {
    let tab = open_page("en/about/index.html");
    let state = eval_string(&tab, &format!("{DROPDOWN}.getAttribute('data-state')"));
    assert_eq!(state, "closed");
    let expanded = eval_string(&tab, &format!("{TRIGGER}.getAttribute('aria-expanded')"));
    assert_eq!(expanded, "false");
}

#[test]
#[ignore]
fn dropdown_starts_open_in_its_section() {
    let tab = open_page("en/programs/adult-education/index.html");
    let state = eval_string(&tab, &format!("{DROPDOWN}.getAttribute('data-state')"));
    assert_eq!(state, "open");
}

#[test]
#[ignore]
fn click_toggles_dropdown() {
    let tab = open_page("en/about/index.html");
    tab.evaluate(&format!("{TRIGGER}.click()"), false).unwrap();
    assert_eq!(
        eval_string(&tab, &format!("{TRIGGER}.getAttribute('aria-expanded')")),
        "true"
    );
    assert!(eval_bool(
        &tab,
        &format!(
            "getComputedStyle(document.getElementById({TRIGGER}.getAttribute('aria-controls'))).display !== 'none'"
        )
    ));

    tab.evaluate(&format!("{TRIGGER}.click()"), false).unwrap();
    assert_eq!(
        eval_string(&tab, &format!("{DROPDOWN}.getAttribute('data-state')")),
        "closed"
    );
}

#[test]
#[ignore]
fn escape_closes_and_returns_focus() {
    let tab = open_page("en/about/index.html");
    let closed_with_focus = eval_bool(
        &tab,
        &format!(
            r#"(() => {{
                const trigger = {TRIGGER};
                trigger.click();
                const link = document.getElementById(trigger.getAttribute('aria-controls')).querySelector('a');
                link.focus();
                link.dispatchEvent(new KeyboardEvent('keydown', {{ key: 'Escape', bubbles: true }}));
                return {DROPDOWN}.getAttribute('data-state') === 'closed'
                    && document.activeElement === trigger;
            }})()"#
        ),
    );
    assert!(closed_with_focus);
}

#[test]
#[ignore]
fn outside_pointerdown_closes() {
    let tab = open_page("en/about/index.html");
    let closed = eval_bool(
        &tab,
        &format!(
            r#"(() => {{
                {TRIGGER}.click();
                document.querySelector('main').dispatchEvent(new PointerEvent('pointerdown', {{ bubbles: true }}));
                return {DROPDOWN}.getAttribute('data-state') === 'closed';
            }})()"#
        ),
    );
    assert!(closed);
}

// ===========================================================================
// Placement
// ===========================================================================

#[test]
#[ignore]
fn placement_matches_server_rules() {
    let tab = open_page("en/about/index.html");
    let cases = [
        // Centered fits.
        ("{left: 500, top: 0, width: 100, height: 40}", 200, "down"),
        // Near the right edge.
        ("{left: 1200, top: 0, width: 60, height: 40}", 240, "left"),
        // Near the left edge.
        ("{left: 0, top: 0, width: 60, height: 40}", 240, "right"),
        // Wider than the viewport, trigger in the right half.
        ("{left: 900, top: 0, width: 60, height: 40}", 1400, "left"),
    ];
    for (trigger, width, expected) in cases {
        let direction = eval_string(
            &tab,
            &format!(
                "window.siteNav.choosePlacement({trigger}, {width}, {{width: 1280, height: 800}}).direction"
            ),
        );
        assert_eq!(direction, expected, "trigger {trigger}, submenu {width}");
    }
}

#[test]
#[ignore]
fn placement_clamps_like_server_rules() {
    let tab = open_page("en/about/index.html");
    let left = tab
        .evaluate(
            "window.siteNav.choosePlacement({left: 200, top: 0, width: 60, height: 40}, 280, {width: 300, height: 600}).left",
            false,
        )
        .unwrap()
        .value
        .unwrap()
        .as_f64()
        .unwrap();
    assert_eq!(left, 0.0);
}

#[test]
#[ignore]
fn collapsed_trigger_is_not_laid_out() {
    let tab = open_page("en/about/index.html");
    assert!(!eval_bool(&tab, "window.siteNav.isLaidOut({width: 0, height: 40})"));
    assert!(!eval_bool(&tab, "window.siteNav.isLaidOut({width: 60, height: 0})"));
    assert!(eval_bool(&tab, "window.siteNav.isLaidOut({width: 60, height: 40})"));
}

#[test]
#[ignore]
fn open_dropdown_stays_in_viewport() {
    let tab = open_page("en/about/index.html");
    let inside = eval_bool(
        &tab,
        &format!(
            r#"(() => {{
                const trigger = {TRIGGER};
                trigger.click();
                const rect = document.getElementById(trigger.getAttribute('aria-controls')).getBoundingClientRect();
                return rect.left >= 0 && rect.right <= document.documentElement.clientWidth;
            }})()"#
        ),
    );
    assert!(inside);
}

// ===========================================================================
// Mobile drawer
// ===========================================================================

const ACCORDION: &str = "document.querySelector('.nav-drawer details.accordion')";

#[test]
#[ignore]
fn mobile_layout_shows_drawer_not_menubar() {
    let tab = open_page_in(mobile_browser(), "en/about/index.html");
    assert!(eval_bool(
        &tab,
        "getComputedStyle(document.querySelector('nav.nav-desktop')).display === 'none'"
    ));
    assert!(eval_bool(
        &tab,
        "getComputedStyle(document.querySelector('nav.nav-mobile')).display !== 'none'"
    ));
}

#[test]
#[ignore]
fn escape_collapses_accordion_and_focuses_summary() {
    let tab = open_page_in(mobile_browser(), "en/programs/adult-education/index.html");
    let collapsed = eval_bool(
        &tab,
        &format!(
            r#"(() => {{
                const toggle = document.getElementById('nav-toggle');
                toggle.checked = true;
                const accordion = {ACCORDION};
                if (!accordion.open) return false;
                const link = accordion.querySelector('.accordion-panel a');
                link.focus();
                link.dispatchEvent(new KeyboardEvent('keydown', {{ key: 'Escape', bubbles: true }}));
                return !accordion.open
                    && document.activeElement === accordion.querySelector('summary')
                    && toggle.checked;
            }})()"#
        ),
    );
    assert!(collapsed);
}

#[test]
#[ignore]
fn escape_outside_open_accordion_closes_drawer() {
    let tab = open_page_in(mobile_browser(), "en/about/index.html");
    let closed = eval_bool(
        &tab,
        &format!(
            r#"(() => {{
                const toggle = document.getElementById('nav-toggle');
                toggle.checked = true;
                const summary = {ACCORDION}.querySelector('summary');
                summary.focus();
                summary.dispatchEvent(new KeyboardEvent('keydown', {{ key: 'Escape', bubbles: true }}));
                return !toggle.checked;
            }})()"#
        ),
    );
    assert!(closed);
}
