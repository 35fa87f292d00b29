//! Property tests over the dialects' request builders and codecs.

use coinbridge_exchanges::kraken::asset_code;
use coinbridge_exchanges::prelude::*;
use proptest::prelude::*;

const BINANCE_DEPTHS: [usize; 8] = [5, 10, 20, 50, 100, 500, 1000, 5000];

fn arb_code() -> impl Strategy<Value = String> {
    "[A-Z]{3}"
}

fn arb_distinct_pair() -> impl Strategy<Value = CurrencyPair> {
    (arb_code(), arb_code())
        .prop_filter("base and quote differ", |(base, quote)| base != quote)
        .prop_map(|(base, quote)| CurrencyPair::new(base, quote).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn binance_depth_is_an_accepted_limit_covering_the_request(depth in 1usize..6000) {
        let request = Binance.order_book_request("ETHBTC", depth);
        let limit: usize = request.params["limit"].parse().unwrap();
        prop_assert!(BINANCE_DEPTHS.contains(&limit));
        prop_assert!(limit >= depth.min(5000));
    }

    #[test]
    fn order_book_keys_separate_symbols(a in arb_distinct_pair(), b in arb_distinct_pair()) {
        prop_assume!(a != b);
        let codec = Bittrex.initial_codec().unwrap();
        let (sa, sb) = (codec.to_symbol(&a).unwrap(), codec.to_symbol(&b).unwrap());
        prop_assert_ne!(
            Bittrex.order_book_request(&sa, 50).endpoint_key(),
            Bittrex.order_book_request(&sb, 50).endpoint_key()
        );
        prop_assert_ne!(
            Poloniex.order_book_request(&sa, 50).endpoint_key(),
            Poloniex.order_book_request(&sb, 50).endpoint_key()
        );
    }

    #[test]
    fn format_codecs_agree_on_pairs(pair in arb_distinct_pair()) {
        for codec in [
            Bitfinex.initial_codec().unwrap(),
            Bittrex.initial_codec().unwrap(),
            Liqui.initial_codec().unwrap(),
            Poloniex.initial_codec().unwrap(),
        ] {
            let symbol = codec.to_symbol(&pair).unwrap();
            prop_assert_eq!(codec.to_pair(&symbol).unwrap(), pair.clone());
        }
    }

    #[test]
    fn kraken_asset_codes_strip_one_class_prefix(code in "[A-Z]{3}", prefix in "[XZ]") {
        let asset = format!("{prefix}{code}");
        prop_assert_eq!(asset_code(&asset), code.as_str());
        prop_assert_eq!(asset_code(&code), code.as_str());
    }
}
