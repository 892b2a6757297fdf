use std::sync::OnceLock;

use crate::icons::brand_css;

static ACCEPTANCE_PAGE_HTML: OnceLock<String> = OnceLock::new();

/// Both views of the acceptance flow (overview with the two confirmations,
/// and the full agreement) in one page. The page reads `?id=` from its own
/// URL, loads the quote from `/api/quote` and posts the acceptance to
/// `/api/submit`.
pub fn acceptance_page() -> &'static str {
    ACCEPTANCE_PAGE_HTML.get_or_init(|| {
        ACCEPTANCE_PAGE_TEMPLATE.replace("/* {{BRAND_CSS}} */", brand_css())
    })
}

const ACCEPTANCE_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Service Acceptance Protocol - Doorbin Waste</title>
    <link rel="icon" type="image/svg+xml" sizes="any" href="/favicon.svg">
    <style>
        /* {{BRAND_CSS}} */
        body {
            font-family: -apple-system, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif;
            background: #0f0f0f;
            color: #e5e7eb;
            margin: 0;
            padding: 48px 16px;
        }
        .container { max-width: 56rem; margin: 0 auto; }
        header.hero { text-align: center; margin-bottom: 48px; }
        header.hero h1 { font-size: 2.25rem; margin: 0 0 8px; }
        header.hero p { color: var(--muted); font-size: 1.125rem; margin: 0; }
        .panel {
            background: var(--panel);
            border: 1px solid var(--border);
            border-radius: 24px;
            padding: 40px;
            line-height: 1.7;
            font-size: 1.05rem;
        }
        .link-button {
            background: none;
            border: none;
            color: var(--accent);
            font: inherit;
            font-weight: bold;
            cursor: pointer;
            padding: 0;
        }
        .link-button:hover { text-decoration: underline; }
        .confirmations { border-top: 1px solid var(--border); margin-top: 40px; padding-top: 40px; }
        .confirmations label { display: flex; gap: 16px; align-items: flex-start; margin-bottom: 20px; cursor: pointer; color: var(--muted); }
        .confirmations label:hover { color: #fff; }
        .confirmations input { width: 22px; height: 22px; accent-color: var(--confirm); }
        .submit {
            width: 100%;
            padding: 20px;
            border: none;
            border-radius: 16px;
            font-size: 1.25rem;
            font-weight: bold;
            letter-spacing: 0.05em;
            text-transform: uppercase;
            background: var(--accent);
            color: #000;
            cursor: pointer;
        }
        .submit:disabled { background: #1f2937; color: #4b5563; cursor: not-allowed; }
        .inline-error { color: #f87171; text-align: center; margin: 24px 0 0; }
        .terms-header { display: flex; justify-content: space-between; align-items: center; border-bottom: 1px solid var(--border); padding-bottom: 16px; margin-bottom: 32px; }
        .terms-header h2 { margin: 0; }
        .legal { height: 65vh; overflow-y: auto; text-align: justify; font-size: 15px; line-height: 1.75; }
        .legal h2 { text-align: center; text-transform: uppercase; letter-spacing: 0.15em; color: #fff; border-bottom: 1px solid var(--border); padding-bottom: 24px; }
        .legal h3 { color: #fff; margin-top: 32px; }
        .legal .notice { margin-top: 64px; padding-top: 40px; border-top: 1px solid var(--border); font-size: 12px; color: #6b7280; font-style: italic; text-align: center; }
        .done { max-width: 28rem; margin: 10vh auto 0; text-align: center; }
        .done .check { font-size: 3rem; color: var(--accent); }
        .done .company { font-size: 0.875rem; color: #6b7280; text-transform: uppercase; letter-spacing: 0.15em; }
        footer { margin-top: 48px; text-align: center; color: #4b5563; font-size: 0.75rem; letter-spacing: 0.15em; text-transform: uppercase; }
        [hidden] { display: none !important; }
    </style>
</head>
<body>
    <div class="container">
        <section id="overview-view">
            <header class="hero">
                <h1 class="brand-icon">Service Acceptance Protocol</h1>
                <p>Doorbin Waste Professional Management Agreement</p>
            </header>

            <div class="panel">
                <p>This Professional Service Agreement governs the door-to-door waste collection and management services provided by <b>Doorbin Waste LLC</b>. Our specialized Valet Trash solution is designed to enhance multi-family residential properties and condominiums through reliable, sustainable, and professional waste removal protocols.</p>
                <p>By proceeding, you acknowledge that our team possesses the technical capacity, industry experience, and necessary resources to manage on-site waste safely and efficiently. This agreement outlines the mutual obligations, service schedules, and performance standards required to maintain optimal environmental conditions for your residents.</p>
                <p>Please review the specific details regarding property units, frequency, and pricing in the full <button type="button" class="link-button" id="show-terms">Terms of Service</button> before final submission.</p>
            </div>

            <p class="inline-error" id="fetch-error" hidden></p>

            <form id="acceptance-form">
                <div class="confirmations">
                    <label>
                        <input type="checkbox" id="accepted-terms" required>
                        <span>I have read and agree to the Doorbin Waste Master Service Agreement.</span>
                    </label>
                    <label>
                        <input type="checkbox" id="authorized" required>
                        <span>I confirm that I have authority to bind the client to these terms.</span>
                    </label>
                </div>
                <button type="submit" class="submit" id="submit-button" disabled>Accept &amp; Continue</button>
            </form>
        </section>

        <section id="terms-view" hidden>
            <div class="terms-header">
                <h2 class="brand-icon">Master Service Agreement</h2>
                <button type="button" class="link-button" id="show-overview">&larr; BACK TO OVERVIEW</button>
            </div>

            <div class="panel legal">
                <h2>Master Service Agreement for Door-to-Door Waste Collection</h2>

                <p><b>PARTIES:</b> This Agreement is entered into by and between <b>DOORBIN WASTE LLC</b>, a Florida Limited Liability Company, hereinafter referred to as the <b>"SERVICE PROVIDER"</b>, and <b data-quote="clientName"></b>, hereinafter referred to as the <b>"CLIENT"</b>, collectively known as the "Parties".</p>

                <p><b>PROPERTY IDENTIFICATION:</b> The services outlined herein shall be exclusively rendered at the residential property located at <b data-quote="propertyLabel"></b>, hereinafter referred to as the "Property".</p>

                <h3>I. DECLARATIONS</h3>
                <p><b>1.1 Capacity:</b> The SERVICE PROVIDER declares it possesses the specialized technical knowledge, licensed equipment, and professional personnel required to execute door-to-door waste management (Valet Trash) in compliance with local health and safety standards.</p>
                <p><b>1.2 Authority:</b> The CLIENT declares that it has the full legal authority to represent the Property and to enter into this binding agreement for the management of waste services on behalf of its residents.</p>

                <h3>II. SCOPE OF SERVICES</h3>
                <p><b>2.1 Operations:</b> The SERVICE PROVIDER shall provide comprehensive door-to-door waste collection for <b><span data-quote="unitCount"></span> residential units</b>. The specific operational frequency and additional conditions are established as follows: <i data-quote="serviceSummary"></i>.</p>
                <p><b>2.2 Digital Oversight:</b> SERVICE PROVIDER will utilize its proprietary Service App to provide the CLIENT with automated activity logs and digital photographic evidence of service completion.</p>

                <h3>III. TERM AND DURATION</h3>
                <p><b>3.1 Initial Term:</b> This Agreement shall commence on the date of electronic acceptance and remain in full force for an initial period of twelve (12) months. This contract will automatically renew for successive twelve-month periods unless written notice of non-renewal is provided at least thirty (30) days prior to the expiration date.</p>

                <h3>IV. FINANCIAL TERMS</h3>
                <p><b>4.1 Monthly Rate:</b> The CLIENT agrees to pay a fixed monthly service fee of <b data-quote="monthlyRate"></b>. Invoices will be generated on the first (1st) day of each month for the current month's service.</p>
                <p><b>4.2 Payments:</b> All payments are due within fifteen (15) calendar days from the invoice date. Late payments may be subject to a monthly interest penalty of <b>5.0%</b> on the outstanding balance.</p>

                <h3>V. INDEMNIFICATION AND LIABILITY</h3>
                <p><b>5.1 Insurance:</b> The SERVICE PROVIDER maintains comprehensive general liability insurance, vehicle insurance, and workers' compensation as required by the State of Florida. The SERVICE PROVIDER shall not be held liable for damages resulting from preexisting Property conditions or third-party negligence.</p>

                <h3>VI. CONFIDENTIALITY AND GOVERNING LAW</h3>
                <p><b>6.1 Data Protection:</b> Both parties agree to maintain the strict confidentiality of all resident data and internal property protocols disclosed during the term of this service.</p>
                <p><b>6.2 Jurisdiction:</b> This Agreement shall be governed and construed in accordance with the laws of the State of Florida. Any legal dispute shall be settled exclusively in the competent courts located within the State of Florida.</p>

                <h3>VII. TERMINATION AND BREACH OF CONTRACT</h3>
                <p><b>7.1 Early Termination:</b> Termination of this Agreement by the CLIENT without cause prior to the expiration of the initial twelve (12) month term shall incur a mandatory early termination fee equal to <b>fifty percent (50%)</b> of the current monthly service rate, in addition to any outstanding balances due.</p>
                <p><b>7.2 Force Majeure:</b> Either party may terminate this Agreement without penalty upon written notice in the event of Force Majeure or circumstances beyond reasonable control that render the fulfillment of services impossible.</p>
                <p><b>7.3 Default and Suspension:</b> Proven violations of contractual obligations by either party, or repetitive failure by the CLIENT to meet financial obligations, may result in the immediate suspension of services and/or the permanent closure of the contract at the SERVICE PROVIDER'S sole discretion.</p>

                <div class="notice"><b>LEGAL NOTICE:</b> This digital document constitutes a Master Service Agreement executed via electronic acceptance. By clicking "ACCEPT &amp; CONTINUE", the CLIENT certifies that they have read, understood, and voluntarily agreed to be bound by all terms, conditions, and operational standards set forth by Doorbin Waste LLC.</div>
            </div>
        </section>

        <section id="submitted-view" class="panel done" hidden>
            <div class="check">&#10004;</div>
            <h2>Agreement Accepted</h2>
            <p>Thank you for choosing to work with us! Your service acceptance has been recorded successfully. We look forward to a successful partnership.</p>
            <div class="company">Doorbin Waste Services LLC</div>
        </section>

        <footer>&copy; <span id="year"></span> Doorbin Waste Services LLC. All rights reserved.</footer>
    </div>

    <script>
        // Phases: loading -> loaded | error; loaded -> submitting -> submitted | loaded
        const LOADING_QUOTE = {
            clientName: 'Loading...',
            propertyLabel: 'Loading...',
            unitCount: '...',
            monthlyRate: '...',
            serviceSummary: '...'
        };

        const state = {
            phase: 'loading',
            view: 'overview',
            recordId: null,
            quote: LOADING_QUOTE,
            error: null,
            acceptedTerms: false,
            authorized: false
        };

        function transition(phase, patch) {
            Object.assign(state, patch || {}, { phase: phase });
            render();
        }

        function render() {
            const submitted = state.phase === 'submitted';
            document.getElementById('submitted-view').hidden = !submitted;
            document.getElementById('overview-view').hidden = submitted || state.view !== 'overview';
            document.getElementById('terms-view').hidden = submitted || state.view !== 'terms';

            document.querySelectorAll('[data-quote]').forEach(el => {
                el.textContent = state.quote[el.dataset.quote];
            });

            const fetchError = document.getElementById('fetch-error');
            fetchError.hidden = state.phase !== 'error';
            fetchError.textContent = state.error || '';

            const button = document.getElementById('submit-button');
            const ready = state.phase === 'loaded' && state.acceptedTerms && state.authorized;
            button.disabled = !ready;
            button.textContent = state.phase === 'submitting' ? 'Processing...' : 'Accept & Continue';
        }

        async function loadQuote(id) {
            try {
                const res = await fetch('/api/quote?id=' + encodeURIComponent(id));
                if (!res.ok) throw new Error('Failed to fetch contract data (' + res.status + ')');
                transition('loaded', { quote: await res.json() });
            } catch (e) {
                console.error('Data Fetch Error', e);
                transition('error', { error: 'Could not load contract details. Please try again later.' });
            }
        }

        async function submitAcceptance(event) {
            event.preventDefault();
            if (state.phase !== 'loaded' || !state.acceptedTerms || !state.authorized) return;

            transition('submitting');
            try {
                const res = await fetch('/api/submit', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({
                        airtable_record_id: state.recordId,
                        accepted_at: new Date().toISOString(),
                        status: 'accepted'
                    })
                });
                if (!res.ok) throw new Error('Submission failed (' + res.status + ')');
                transition('submitted');
            } catch (e) {
                console.error('Submission Error', e);
                alert('There was an error submitting your acceptance. Please try again.');
                transition('loaded');
            }
        }

        document.getElementById('show-terms').addEventListener('click', () => {
            state.view = 'terms';
            render();
        });
        document.getElementById('show-overview').addEventListener('click', () => {
            state.view = 'overview';
            render();
        });
        document.getElementById('accepted-terms').addEventListener('change', e => {
            state.acceptedTerms = e.target.checked;
            render();
        });
        document.getElementById('authorized').addEventListener('change', e => {
            state.authorized = e.target.checked;
            render();
        });
        document.getElementById('acceptance-form').addEventListener('submit', submitAcceptance);
        document.getElementById('year').textContent = new Date().getFullYear();

        const id = new URLSearchParams(window.location.search).get('id');
        if (id) {
            state.recordId = id;
            render();
            loadQuote(id);
        } else {
            transition('error', { error: 'No record ID found in URL.' });
        }
    </script>
</body>
</html>"#;
